//! Client-side session: the bearer token and its metadata.
//!
//! `SessionStore` is the only code that touches the persistent store. Screens
//! and repositories receive it (through `ApiClient`) instead of reaching for
//! a global, so tests swap in a `MemoryStore`.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::Role;

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";
pub const EXPIRY_KEY: &str = "tokenExpiry";

/// Snapshot of what is stored. A missing token means unauthenticated; the
/// token itself is never inspected, the backend decides whether it is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub expiry: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Informational only. An expired hint does not block requests.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist a token exactly as given. Blank input is ignored and
    /// reported as `false`.
    pub fn save_token(&self, token: &str) -> bool {
        if token.trim().is_empty() {
            return false;
        }
        match self.store.set(TOKEN_KEY, token) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to persist session token");
                false
            }
        }
    }

    /// Never fails: an unreadable store is the same as no session.
    pub fn get_token(&self) -> Option<String> {
        self.read(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Removes the token, role and expiry. Safe to call repeatedly.
    pub fn clear_token(&self) {
        for key in [TOKEN_KEY, ROLE_KEY, EXPIRY_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to clear session entry");
            }
        }
        debug!("Session cleared");
    }

    pub fn save_role(&self, role: &Role) -> bool {
        self.write(ROLE_KEY, role.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.read(ROLE_KEY).map(Role::from)
    }

    pub fn save_expiry(&self, expiry: DateTime<Utc>) -> bool {
        self.write(EXPIRY_KEY, &expiry.to_rfc3339())
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.read(EXPIRY_KEY)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring unparseable session expiry");
                None
            }
        }
    }

    pub fn session(&self) -> Session {
        Session {
            token: self.get_token(),
            role: self.role(),
            expiry: self.expiry(),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session entry");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Failed to persist session entry");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_save_then_get_returns_same_token() {
        let session = SessionStore::in_memory();
        for token in [
            "abc123",
            " abc123 ",
            "eyJhbGciOiJIUzI1NiJ9.e30.sig",
            "with space inside",
        ] {
            assert!(session.save_token(token));
            assert_eq!(session.get_token().as_deref(), Some(token));
        }
    }

    #[test]
    fn test_save_empty_token_is_noop() {
        let session = SessionStore::in_memory();
        assert!(session.save_token("kept"));
        assert!(!session.save_token(""));
        assert!(!session.save_token("   "));
        assert_eq!(session.get_token().as_deref(), Some("kept"));
    }

    #[test]
    fn test_clear_token_from_any_state() {
        let session = SessionStore::in_memory();
        session.clear_token();
        assert_eq!(session.get_token(), None);

        session.save_token("abc");
        session.save_role(&Role::Teacher);
        session.save_expiry(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        session.clear_token();
        session.clear_token();

        assert_eq!(session.session(), Session::default());
    }

    #[test]
    fn test_session_snapshot() {
        let session = SessionStore::in_memory();
        let expiry = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
        session.save_token("abc");
        session.save_role(&Role::Admin);
        session.save_expiry(expiry);

        let snapshot = session.session();
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.role, Some(Role::Admin));
        assert_eq!(snapshot.expiry, Some(expiry));
        assert!(!snapshot.is_expired_at(Utc.with_ymd_and_hms(2030, 5, 1, 0, 0, 0).unwrap()));
        assert!(snapshot.is_expired_at(Utc.with_ymd_and_hms(2030, 7, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_garbage_expiry_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set(EXPIRY_KEY, "next tuesday").unwrap();
        let session = SessionStore::new(store);
        assert_eq!(session.expiry(), None);
    }

    #[test]
    fn test_file_backed_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = SessionStore::new(Arc::new(FileStore::new(&path)));
        first.save_token("persisted");

        let second = SessionStore::new(Arc::new(FileStore::new(&path)));
        assert_eq!(second.get_token().as_deref(), Some("persisted"));
    }
}
