use super::Repository;
use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Branch, NewBranch};
use crate::validation;

pub struct BranchesRepository {
    inner: Repository<Branch>,
}

impl BranchesRepository {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Repository::new(client, "branches"),
        }
    }

    pub async fn list(&self) -> Result<Vec<Branch>> {
        self.inner.list().await
    }

    pub async fn create(&self, branch: &NewBranch) -> Result<Option<Branch>> {
        validation::validate_new_branch(branch)?;
        self.inner.create(branch).await
    }
}
