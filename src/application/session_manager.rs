//! Session lifecycle around one request: start, commit, destroy.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::foundation::SessionId;
use crate::domain::session::Session;
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Loads the session named by the visitor's cookie, or starts a new one.
    ///
    /// Unknown and expired ids are never reused: the visitor gets a fresh id.
    pub async fn start(&self, id: Option<SessionId>) -> Result<Session, SessionStoreError> {
        let Some(id) = id else {
            return Ok(Session::new(self.ttl));
        };

        match self.store.load(&id).await? {
            Some(record) if !record.is_expired(Utc::now()) => {
                tracing::debug!(session_id = %id, "Session loaded");
                Ok(Session::from_record(id, record))
            }
            _ => {
                tracing::debug!(session_id = %id, "Session unknown or expired, starting new");
                Ok(Session::new(self.ttl))
            }
        }
    }

    /// Saves the session and drops the record under its previous id.
    ///
    /// A new session nobody wrote to is not stored. Returns whether the
    /// session was written, which is when the caller should (re)issue the
    /// cookie.
    pub async fn commit(&self, session: &mut Session) -> Result<bool, SessionStoreError> {
        if session.is_new() && !session.is_dirty() {
            return Ok(false);
        }

        session.touch(self.ttl);
        self.store
            .save(&session.id(), &session.to_record(), self.ttl)
            .await?;
        if let Some(previous) = session.previous_id() {
            self.store.destroy(&previous).await?;
            tracing::debug!(session_id = %session.id(), previous_id = %previous, "Session rotated");
        }
        tracing::debug!(session_id = %session.id(), "Session saved");

        session.mark_committed();
        Ok(true)
    }

    pub async fn destroy(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.store.destroy(&session.id()).await?;
        if let Some(previous) = session.previous_id() {
            self.store.destroy(&previous).await?;
        }
        Ok(())
    }
    /// Removes expired records from the store.
    pub async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let removed = self.store.purge_expired().await?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}
