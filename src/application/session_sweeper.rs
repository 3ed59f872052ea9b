//! Background removal of expired sessions.
//!
//! Backends without native expiry keep every record they were given until
//! something deletes it. The sweeper calls `purge_expired` on a fixed
//! interval until shutdown is signalled.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::application::SessionManager;

pub struct SessionSweeper {
    sessions: SessionManager,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: SessionManager, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Sweeps every `interval` until `shutdown` turns true.
    ///
    /// Store errors are logged and the next tick tries again.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Session sweeper stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// One sweep. Returns how many records were removed, `0` on error.
    pub async fn sweep_once(&self) -> u64 {
        match self.sessions.purge_expired().await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "Session sweep failed");
                0
            }
        }
    }
}

impl std::fmt::Debug for SessionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSweeper")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session_store::InMemorySessionStore;
    use crate::domain::foundation::SessionId;
    use crate::domain::session::SessionRecord;
    use crate::ports::{SessionStore, SessionStoreError};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn expired() -> SessionRecord {
        SessionRecord {
            data: BTreeMap::new(),
            expires_at: Utc::now() - chrono::Duration::seconds(1),
        }
    }

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn load(&self, _: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
            Ok(None)
        }
        async fn save(
            &self,
            _: &SessionId,
            _: &SessionRecord,
            _: chrono::Duration,
        ) -> Result<(), SessionStoreError> {
            Ok(())
        }
        async fn destroy(&self, _: &SessionId) -> Result<(), SessionStoreError> {
            Ok(())
        }
        async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
            Err(SessionStoreError::Backend("down".into()))
        }
    }

    #[tokio::test]
    async fn run_purges_until_shutdown() {
        let store = Arc::new(InMemorySessionStore::new());
        for _ in 0..5 {
            store
                .save(&SessionId::new(), &expired(), chrono::Duration::minutes(1))
                .await
                .unwrap();
        }
        let sweeper = SessionSweeper::new(
            SessionManager::new(store.clone(), chrono::Duration::minutes(1)),
            Duration::from_millis(10),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

        time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop")
            .unwrap();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn sweep_errors_are_not_fatal() {
        let sweeper = SessionSweeper::new(
            SessionManager::new(Arc::new(BrokenStore), chrono::Duration::minutes(1)),
            Duration::from_secs(60),
        );
        assert_eq!(sweeper.sweep_once().await, 0);
    }
}
