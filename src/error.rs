//! Error type shared by the client library.
//!
//! Every failure a screen can see is one of these variants. The CLI maps
//! `MissingToken` and `SessionExpired` to the same "log in again" message;
//! everything else is reported with its own text.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No token is stored; the request was never sent.
    #[error("Not logged in")]
    MissingToken,

    /// The backend answered 401. The stored session has already been cleared.
    #[error("Session expired")]
    SessionExpired,

    #[error("Server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("{}", summarize_validation(.0))]
    Validation(BTreeMap<String, Vec<String>>),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Build a validation error for a single field.
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), vec![message.into()]);
        ClientError::Validation(errors)
    }

    /// True when the caller should send the user back to the login command.
    pub fn needs_login(&self) -> bool {
        matches!(self, ClientError::MissingToken | ClientError::SessionExpired)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

fn summarize_validation(errors: &BTreeMap<String, Vec<String>>) -> String {
    if errors.len() == 1 {
        if let Some((_, messages)) = errors.iter().next() {
            if let Some(first) = messages.first() {
                return first.clone();
            }
        }
    }
    format!("Validation failed for {} fields", errors.len())
}

/// Collects field errors before a form is submitted.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Record the error of a `Result<(), String>` check, if any.
    pub fn check(&mut self, field: &str, result: std::result::Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(self.errors))
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
