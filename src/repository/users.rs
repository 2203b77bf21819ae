use serde_json::Value;

use super::{normalize_record, Repository};
use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{NewStaff, RecordId, User};
use crate::validation;

pub struct UsersRepository {
    inner: Repository<User>,
}

impl UsersRepository {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Repository::new(client, "users"),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.inner.list().await
    }

    pub async fn get(&self, id: &RecordId) -> Result<User> {
        self.inner.get(id).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }

    /// The account behind the stored token.
    pub async fn me(&self) -> Result<User> {
        let value: Value = self.inner.client().get_json("users/me").await?;
        normalize_record(&value)
            .ok_or_else(|| ClientError::Decode("No user in current-user response".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffKind {
    Admin,
    Teacher,
}

impl StaffKind {
    pub fn path(&self) -> &'static str {
        match self {
            StaffKind::Admin => "users/admins",
            StaffKind::Teacher => "users/teachers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaffKind::Admin => "admin",
            StaffKind::Teacher => "teacher",
        }
    }
}

/// Admin and teacher accounts share one shape and differ only in endpoint.
pub struct StaffRepository {
    kind: StaffKind,
    inner: Repository<User>,
}

impl StaffRepository {
    pub fn new(client: ApiClient, kind: StaffKind) -> Self {
        Self {
            kind,
            inner: Repository::new(client, kind.path()),
        }
    }

    pub fn kind(&self) -> StaffKind {
        self.kind
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.inner.list().await
    }

    /// Validates the form locally before anything is sent.
    pub async fn create(&self, staff: &NewStaff) -> Result<Option<User>> {
        validation::validate_new_staff(staff)?;
        self.inner.create(staff).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        self.inner.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::logged_in_client;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_me() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "_id": "me", "name": "Yaw", "role": "teacher" }
            })))
            .mount(&server)
            .await;

        let users = UsersRepository::new(logged_in_client(&server).await);
        let me = users.me().await.unwrap();
        assert_eq!(me.name, "Yaw");
        assert_eq!(me.role, Some(crate::models::Role::Teacher));
    }

    #[tokio::test]
    async fn test_staff_list_uses_kind_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/teachers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "teachers": [{ "_id": "t1", "name": "Efua" }] }
            })))
            .mount(&server)
            .await;

        let teachers = StaffRepository::new(logged_in_client(&server).await, StaffKind::Teacher);
        let list = teachers.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_str(), "t1");
    }

    #[tokio::test]
    async fn test_create_staff_rejects_short_password_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let admins = StaffRepository::new(logged_in_client(&server).await, StaffKind::Admin);
        let err = admins
            .create(&NewStaff {
                name: "Adwoa".into(),
                email: "adwoa@example.com".into(),
                phone: "0200000000".into(),
                password: "short".into(),
                branch: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_staff_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/admins"))
            .and(body_partial_json(json!({ "email": "adwoa@example.com", "branch": "cs" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "admin": { "_id": "a9", "name": "Adwoa" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let admins = StaffRepository::new(logged_in_client(&server).await, StaffKind::Admin);
        let created = admins
            .create(&NewStaff {
                name: "Adwoa".into(),
                email: "adwoa@example.com".into(),
                phone: "0200000000".into(),
                password: "long-enough".into(),
                branch: Some("cs".into()),
            })
            .await
            .unwrap();
        assert_eq!(created.unwrap().id.as_str(), "a9");
    }
}
