//! Login, logout and the liveness probe.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{envelope, ApiClient};
use crate::models::Role;
use crate::session::Session;

const LOGIN_PATH: &str = "auth/login";
const CURRENT_USER_PATH: &str = "users/me";
const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please check your credentials and try again.";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Why a login attempt did not produce a session.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct LoginFailure {
    /// HTTP status, absent when the backend was unreachable.
    pub status: Option<StatusCode>,
    pub message: String,
}

impl LoginFailure {
    fn new(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Post credentials and persist the token, role and expiry the backend
    /// returns. Concurrent logins race; the last one to finish wins.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session, LoginFailure> {
        let identifier = identifier.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(LoginFailure::new(None, "Email and password are required"));
        }

        let request = self
            .client
            .public(Method::POST, LOGIN_PATH)
            .json(&LoginRequest {
                email: identifier,
                password: secret,
            });

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login request failed");
                return Err(LoginFailure::new(
                    None,
                    format!("Could not reach the server: {}", e),
                ));
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let value: Option<Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = envelope::message_from_body(&body)
                .unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string());
            debug!(%status, "Login rejected");
            return Err(LoginFailure::new(Some(status), message));
        }

        let value = value.unwrap_or(Value::Null);
        if envelope::is_declined(&value) {
            let message =
                envelope::extract_message(&value).unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string());
            return Err(LoginFailure::new(Some(status), message));
        }

        let token = envelope::extract_token(&value).ok_or_else(|| {
            LoginFailure::new(Some(status), "Login response did not include a token")
        })?;

        let session = self.client.session();
        // A previous user's role or expiry must not leak into this session.
        session.clear_token();
        if !session.save_token(&token) {
            return Err(LoginFailure::new(Some(status), "Could not store the session token"));
        }
        if let Some(role) = envelope::extract_role(&value) {
            session.save_role(&Role::from(role));
        }
        if let Some(expiry) = envelope::extract_expiry(&value) {
            session.save_expiry(expiry);
        }

        let snapshot = session.session();
        info!(role = ?snapshot.role, "Logged in");
        Ok(snapshot)
    }

    /// `GET users/me` with the stored token. True only on a 2xx answer;
    /// a missing token, an unreachable server and any error status all
    /// read as "not authenticated".
    pub async fn is_authenticated(&self) -> bool {
        let request = match self.client.authorized(Method::GET, CURRENT_USER_PATH) {
            Ok(request) => request,
            Err(_) => return false,
        };

        match self.client.send(request).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Session probe failed");
                false
            }
        }
    }

    pub fn logout(&self) {
        self.client.session().clear_token();
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> AuthService {
        AuthService::new(ApiClient::with_client(
            reqwest::Client::new(),
            &server.uri(),
            SessionStore::in_memory(),
        ))
    }

    async fn login_with_body(body: Value) -> Option<String> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let auth = service(&server);
        auth.login("ama@example.com", "secret-pass").await.unwrap();
        auth.client.session().get_token()
    }

    #[tokio::test]
    async fn test_nested_and_top_level_tokens_store_the_same_value() {
        let top = login_with_body(json!({ "success": true, "token": "tok-9" })).await;
        let nested = login_with_body(json!({ "success": true, "data": { "token": "tok-9" } })).await;
        assert_eq!(top.as_deref(), Some("tok-9"));
        assert_eq!(top, nested);
    }

    #[tokio::test]
    async fn test_login_posts_credentials_and_stores_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "kofi@example.com", "password": "pw12345678" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "token": "abc",
                    "user": { "role": "admin", "name": "Kofi" },
                    "expiresAt": "2031-01-01T00:00:00Z"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = service(&server);
        let session = auth.login(" kofi@example.com ", "pw12345678").await.unwrap();
        assert_eq!(session.token.as_deref(), Some("abc"));
        assert_eq!(session.role, Some(Role::Admin));
        assert!(session.expiry.is_some());
    }

    #[tokio::test]
    async fn test_login_failure_uses_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "success": false, "message": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let auth = service(&server);
        let failure = auth.login("a@b.co", "wrong").await.unwrap_err();
        assert_eq!(failure.status, Some(StatusCode::UNAUTHORIZED));
        assert_eq!(failure.message, "Invalid credentials");
        assert_eq!(auth.client.session().get_token(), None);
    }

    #[tokio::test]
    async fn test_login_failure_without_body_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let failure = service(&server).login("a@b.co", "pw").await.unwrap_err();
        assert_eq!(failure.message, GENERIC_LOGIN_FAILURE);
    }

    #[tokio::test]
    async fn test_login_success_without_token_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let failure = service(&server).login("a@b.co", "pw").await.unwrap_err();
        assert!(failure.message.contains("did not include a token"));
    }

    #[tokio::test]
    async fn test_is_authenticated_probes_current_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("Authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = service(&server);
        auth.client.session().save_token("abc123");
        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_is_authenticated_false_on_error_or_no_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let auth = service(&server);
        assert!(!auth.is_authenticated().await);

        auth.client.session().save_token("abc123");
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_is_authenticated_false_when_unreachable() {
        let auth = AuthService::new(ApiClient::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            SessionStore::in_memory(),
        ));
        auth.client.session().save_token("abc123");
        assert!(!auth.is_authenticated().await);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let auth = AuthService::new(ApiClient::with_client(
            reqwest::Client::new(),
            "http://localhost",
            SessionStore::in_memory(),
        ));
        auth.client.session().save_token("abc");
        auth.logout();
        auth.logout();
        assert_eq!(auth.client.session().get_token(), None);
    }
}
