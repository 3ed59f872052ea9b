//! Redis-backed session store for multi-server deployments.
//!
//! Each session is one JSON string under `{key_prefix}{id}`, written with
//! `SET .. EX` so Redis expires it on its own.

use std::future::Future;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionRecord;
use crate::ports::{SessionStore, SessionStoreError};

const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(5);

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    timeout: StdDuration,
}

fn backend_error(e: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Backend(e.to_string())
}

/// Runs a Redis call, failing with `Backend` once `timeout` elapses.
async fn bounded<T, F>(timeout: StdDuration, what: &str, fut: F) -> Result<T, SessionStoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(backend_error),
        Err(_) => Err(SessionStoreError::Backend(format!(
            "redis {} timed out after {:?}",
            what, timeout
        ))),
    }
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Opens a multiplexed connection to `url`. `timeout` bounds the
    /// connect and every later command.
    pub async fn connect(
        url: &str,
        key_prefix: impl Into<String>,
        timeout: StdDuration,
    ) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url).map_err(backend_error)?;
        let conn = bounded(timeout, "connect", client.get_multiplexed_tokio_connection()).await?;
        Ok(Self::new(conn, key_prefix).with_timeout(timeout))
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    fn key(&self, id: &SessionId) -> String {
        format!("{}{}", self.key_prefix, id)
    }
}

/// Expiry in whole seconds, at least one.
fn expiry_secs(ttl: Duration) -> i64 {
    ttl.num_seconds().max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let key = self.key(id);
        let json: Option<String> = bounded(self.timeout, "GET", conn.get(key)).await?;

        let Some(json) = json else {
            return Ok(None);
        };
        let record: SessionRecord = serde_json::from_str(&json)?;
        if record.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(id)).arg(json).arg("EX").arg(expiry_secs(ttl));
        bounded(self.timeout, "SET", cmd.query_async::<_, ()>(&mut conn)).await?;
        tracing::debug!(session_id = %id, "Session saved to redis");
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        let key = self.key(id);
        bounded(self.timeout, "DEL", conn.del::<_, ()>(key)).await
    }

    // keys carry their own EX
    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        Ok(0)
    }
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
