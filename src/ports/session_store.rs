//! Session Store Port - Interface for persisting visitor sessions.
//!
//! Backends: in-memory (tests, single process), YAML files, Redis and
//! PostgreSQL. The framework adds no locking of its own; concurrent requests
//! for the same session get whatever the backend provides.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionRecord;

/// Errors that can occur during session store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Failed to serialize session: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Session backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for SessionStoreError {
    fn from(err: serde_json::Error) -> Self {
        SessionStoreError::Serialization(err.to_string())
    }
}

/// Port for persisting and loading sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session record.
    ///
    /// Returns `Ok(None)` when nothing is stored under `id` or the stored
    /// record has expired.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Save a session record, replacing any previous one.
    ///
    /// `ttl` is how long the backend should keep it; backends without native
    /// expiry rely on `record.expires_at` instead.
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// Delete a session. Deleting a missing session is not an error.
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Drop every expired record, returning how many were removed.
    ///
    /// Backends with native expiry return `Ok(0)`.
    async fn purge_expired(&self) -> Result<u64, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_convert_to_serialization() {
        let err: SessionStoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SessionStoreError::Serialization(_)));
        assert!(err.to_string().starts_with("Failed to serialize session"));
    }

    #[test]
    fn session_store_is_object_safe() {
        fn _assert_trait_object(_: &dyn SessionStore) {}
    }
}
