//! Authenticated request helper and the single response interceptor.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope;
use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::models::RecordId;
use crate::session::SessionStore;

/// HTTP client bound to one backend and one session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("bookdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, &config.base_url, session))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, session: SessionStore) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `path` followed by `id` as a single escaped segment, so `/`, `?` or
    /// `#` inside an id can never reach another endpoint.
    pub fn record_url(&self, path: &str, id: &RecordId) -> Result<Url> {
        let id = id.as_str();
        if id.trim().is_empty() || id == "." || id == ".." {
            return Err(ClientError::validation_field(
                "id",
                format!("Invalid record id: '{}'", id),
            ));
        }

        let mut url = Url::parse(&self.url(path))
            .map_err(|e| ClientError::Decode(format!("Invalid API URL: {}", e)))?;
        let url_str = url.to_string();
        url.path_segments_mut()
            .map_err(|_| ClientError::Decode(format!("API URL cannot take a path: {}", url_str)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Request without credentials (login).
    pub fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Request carrying the stored bearer token. Fails before touching the
    /// network when there is no token.
    pub fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.session.get_token().ok_or(ClientError::MissingToken)?;
        Ok(self
            .http
            .request(method, self.url(path))
            .bearer_auth(token))
    }

    /// Authorized request for one record under `path`.
    pub fn authorized_record(
        &self,
        method: Method,
        path: &str,
        id: &RecordId,
    ) -> Result<RequestBuilder> {
        let token = self.session.get_token().ok_or(ClientError::MissingToken)?;
        let url = self.record_url(path, id)?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Send an authorized request. A 401 ends the session here, for every
    /// caller; other failures become `ClientError::Api` with the backend's
    /// message when it sent one.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "Response received");

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the session token, clearing session");
            self.session.clear_token();
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = envelope::message_from_body(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            return Err(ClientError::Api { status, message });
        }

        Ok(response)
    }

    /// Send an authorized request and parse the JSON body. An empty body is
    /// `Value::Null`; a 2xx body with `success: false` is an error.
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = self.send(request).await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("Invalid JSON from server: {}", e)))?;

        if envelope::is_declined(&value) {
            let message = envelope::extract_message(&value)
                .unwrap_or_else(|| "Request was declined by the server".to_string());
            return Err(ClientError::Api { status, message });
        }

        Ok(value)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        self.send_json(self.authorized(Method::GET, path)?).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send_json(self.authorized(Method::POST, path)?.json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send_json(self.authorized(Method::DELETE, path)?).await
    }
}
