//! PostgreSQL session store.
//!
//! Sessions live in one table:
//!
//! ```sql
//! CREATE TABLE sessions (
//!     id         TEXT PRIMARY KEY,
//!     data       TEXT NOT NULL,      -- JSON object
//!     expires_at BIGINT NOT NULL     -- unix seconds
//! );
//! ```

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionRecord;
use crate::ports::{SessionStore, SessionStoreError};
use crate::query::{Condition, Delete, Insert, Placeholder, QueryError, Select, Statement};

pub const DEFAULT_SESSIONS_TABLE: &str = "sessions";

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
    table: String,
}

fn db_error(e: sqlx::Error) -> SessionStoreError {
    SessionStoreError::Backend(e.to_string())
}

impl From<QueryError> for SessionStoreError {
    fn from(e: QueryError) -> Self {
        SessionStoreError::Backend(e.to_string())
    }
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: DEFAULT_SESSIONS_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Creates the sessions table if it does not exist.
    pub async fn migrate(&self) -> Result<(), SessionStoreError> {
        let table = crate::query::validate_identifier(&self.table)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id TEXT PRIMARY KEY, \
             data TEXT NOT NULL, \
             expires_at BIGINT NOT NULL)",
            table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    fn load_statement(&self, id: &SessionId, now: i64) -> Result<Statement, QueryError> {
        Select::from(self.table.as_str())
            .columns(["data", "expires_at"])
            .filter(Condition::eq("id", id.to_string()))
            .filter(Condition::gt("expires_at", now))
            .limit(1)
            .build(Placeholder::Dollar)
    }

    fn save_statement(
        &self,
        id: &SessionId,
        data: String,
        expires_at: i64,
    ) -> Result<Statement, QueryError> {
        let mut stmt = Insert::into(self.table.as_str())
            .value("id", id.to_string())
            .value("data", data)
            .value("expires_at", expires_at)
            .build(Placeholder::Dollar)?;
        stmt.sql.push_str(
            " ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at",
        );
        Ok(stmt)
    }

    fn destroy_statement(&self, id: &SessionId) -> Result<Statement, QueryError> {
        Delete::from(self.table.as_str())
            .filter(Condition::eq("id", id.to_string()))
            .build(Placeholder::Dollar)
    }

    fn purge_statement(&self, now: i64) -> Result<Statement, QueryError> {
        Delete::from(self.table.as_str())
            .filter(Condition::le("expires_at", now))
            .build(Placeholder::Dollar)
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
        let stmt = self.load_statement(id, Utc::now().timestamp())?;
        let row = stmt
            .bind_postgres()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let data: String = row.try_get("data").map_err(db_error)?;
        let expires_at: i64 = row.try_get("expires_at").map_err(db_error)?;
        let expires_at = Utc
            .timestamp_opt(expires_at, 0)
            .single()
            .ok_or_else(|| SessionStoreError::Serialization(format!("bad expiry {}", expires_at)))?;

        Ok(Some(SessionRecord {
            data: serde_json::from_str(&data)?,
            expires_at,
        }))
    }

    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        _ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let data = serde_json::to_string(&record.data)?;
        let stmt = self.save_statement(id, data, record.expires_at.timestamp())?;
        stmt.bind_postgres()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        tracing::debug!(session_id = %id, "Session saved to postgres");
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.destroy_statement(id)?
            .bind_postgres()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let stmt = self.purge_statement(Utc::now().timestamp())?;
        let result = stmt
            .bind_postgres()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }
}
