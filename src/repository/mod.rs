//! Typed data access, one repository per backend resource.
//!
//! Screens never build requests or unwrap envelopes themselves: they call a
//! repository and get normalized records back.

mod books;
mod branches;
mod downloads;
mod users;

pub use books::BooksRepository;
pub use branches::BranchesRepository;
pub use downloads::{DownloadedFile, DownloadsRepository};
pub use users::{StaffKind, StaffRepository, UsersRepository};

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::{envelope, ApiClient};
use crate::error::{ClientError, Result};
use crate::models::{RecordId, Resource};

/// Normalize a list response, dropping malformed records.
pub fn normalize_list<T: Resource>(value: &Value) -> Vec<T> {
    let raw = envelope::extract_list(value, T::COLLECTION_KEYS);
    let records: Vec<T> = raw.iter().filter_map(T::from_value).collect();
    if records.len() < raw.len() {
        debug!(
            dropped = raw.len() - records.len(),
            kept = records.len(),
            "Dropped malformed records"
        );
    }
    records
}

pub fn normalize_record<T: Resource>(value: &Value) -> Option<T> {
    envelope::extract_object(value, T::RECORD_KEYS).and_then(T::from_value)
}

/// CRUD over one collection endpoint.
pub struct Repository<T> {
    client: ApiClient,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> Repository<T> {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into().trim_matches('/').to_string(),
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<T>> {
        let value = self.client.get_json(&self.path).await?;
        Ok(normalize_list(&value))
    }

    pub async fn list_with_query(&self, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let request = self.client.authorized(Method::GET, &self.path)?.query(query);
        let value = self.client.send_json(request).await?;
        Ok(normalize_list(&value))
    }

    pub async fn get(&self, id: &RecordId) -> Result<T> {
        let request = self.client.authorized_record(Method::GET, &self.path, id)?;
        let value = self.client.send_json(request).await?;
        normalize_record(&value)
            .ok_or_else(|| ClientError::Decode(format!("No usable record in response for {}", id)))
    }

    /// Post a new record. Returns the created record when the backend echoes it.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<Option<T>> {
        let value = self.client.post_json(&self.path, body).await?;
        Ok(normalize_record(&value))
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let request = self.client.authorized_record(Method::DELETE, &self.path, id)?;
        self.client.send_json(request).await?;
        debug!(path = %self.path, %id, "Record deleted");
        Ok(())
    }
}
