//! Database auth adapter - checks bcrypt hashes stored in a users table.
//!
//! The table and column names come from configuration and are validated as
//! SQL identifiers when the adapter is built. Lookups are rendered by the
//! query builder, so the username is always a bound parameter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::config::DatabaseAuthSettings;
use crate::domain::auth::{AuthIdentity, ConfigurationError, Credentials};
use crate::domain::foundation::{AccessLevel, AuthId, DEFAULT_ACCESS, NO_ACCESS};
use crate::ports::{AdapterError, AuthAdapter, CredentialCheck};
use crate::query::{Condition, Placeholder, Select, SqlValue, Statement};

pub const DATABASE_ADAPTER_ID: &str = "database";

#[derive(Debug, Clone)]
pub struct DatabaseAuthAdapter {
    pool: PgPool,
    table: String,
    uid_field: String,
    pw_field: String,
    role_field: Option<String>,
}

impl DatabaseAuthAdapter {
    /// Builds the adapter, checking that every configured name is usable.
    pub fn new(pool: PgPool, settings: &DatabaseAuthSettings) -> Result<Self, ConfigurationError> {
        let required = |value: &str, key: &str| {
            if value.trim().is_empty() {
                Err(ConfigurationError::missing(format!("auth.database.{}", key)))
            } else {
                Ok(value.trim().to_string())
            }
        };

        let adapter = Self {
            pool,
            table: required(&settings.authtable, "authtable")?,
            uid_field: required(&settings.uidfield, "uidfield")?,
            pw_field: required(&settings.pwfield, "pwfield")?,
            role_field: settings
                .rolefield
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };

        // render both lookups once so bad names fail at start-up
        adapter
            .credential_query("probe")
            .map_err(|e| ConfigurationError::invalid("auth.database", e.to_string()))?;
        if adapter.role_field.is_some() {
            adapter
                .level_query(SqlValue::from("probe"))
                .map_err(|e| ConfigurationError::invalid("auth.database.rolefield", e.to_string()))?;
        }
        Ok(adapter)
    }

    fn credential_query(&self, username: &str) -> Result<Statement, crate::query::QueryError> {
        Select::from(self.table.as_str())
            .columns([self.uid_field.as_str(), self.pw_field.as_str()])
            .filter(Condition::eq(&self.uid_field, username))
            .limit(1)
            .build(Placeholder::Dollar)
    }

    fn level_query(&self, uid: SqlValue) -> Result<Statement, crate::query::QueryError> {
        let role_field = self.role_field.as_deref().unwrap_or_default();
        Select::from(self.table.as_str())
            .columns([role_field])
            .filter(Condition::eq(&self.uid_field, uid))
            .limit(1)
            .build(Placeholder::Dollar)
    }
}

/// Reads a column that may be text or an integer.
fn scalar(row: &PgRow, index: usize) -> Option<Value> {
    if let Ok(Some(text)) = row.try_get::<Option<String>, _>(index) {
        return Some(Value::String(text));
    }
    if let Ok(Some(int)) = row.try_get::<Option<i64>, _>(index) {
        return Some(Value::from(int));
    }
    row.try_get::<Option<i32>, _>(index)
        .ok()
        .flatten()
        .map(Value::from)
}

fn to_level(value: &Value) -> Option<AccessLevel> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| AccessLevel::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

async fn verify_password(password: SecretString, hash: String) -> Result<bool, AdapterError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password.expose_secret(), &hash))
        .await
        .map_err(|e| AdapterError::unavailable(format!("password check aborted: {}", e)))?;

    // a malformed stored hash can never match
    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash is unusable");
        false
    }))
}

#[async_trait]
impl AuthAdapter for DatabaseAuthAdapter {
    fn identifier(&self) -> &str {
        DATABASE_ADAPTER_ID
    }

    async fn check_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<CredentialCheck, AdapterError> {
        let Credentials::Password { username, password } = credentials else {
            return Ok(CredentialCheck::Rejected);
        };
        if credentials.is_blank() {
            return Ok(CredentialCheck::Rejected);
        }

        let statement = self
            .credential_query(username)
            .map_err(|e| AdapterError::misconfigured(e.to_string()))?;
        let row = statement
            .bind_postgres()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AdapterError::unavailable(format!("user lookup failed: {}", e)))?;

        let Some(row) = row else {
            return Ok(CredentialCheck::Rejected);
        };
        let uid = scalar(&row, 0).ok_or_else(|| {
            AdapterError::misconfigured(format!("column '{}' is not text or integer", self.uid_field))
        })?;
        let hash: Option<String> = row
            .try_get(1)
            .map_err(|e| AdapterError::misconfigured(format!("column '{}': {}", self.pw_field, e)))?;
        let Some(hash) = hash else {
            return Ok(CredentialCheck::Rejected);
        };

        if verify_password(password.clone(), hash).await? {
            Ok(CredentialCheck::Accepted(AuthIdentity::new(AuthId::new(uid))))
        } else {
            Ok(CredentialCheck::Rejected)
        }
    }

    async fn access_level(&self, identity: &AuthIdentity) -> AccessLevel {
        if self.role_field.is_none() {
            return DEFAULT_ACCESS;
        }

        let statement = match self.level_query(SqlValue::from(identity.id.as_value().clone())) {
            Ok(statement) => statement,
            Err(_) => return NO_ACCESS,
        };
        let row = match statement.bind_postgres().fetch_optional(&self.pool).await {
            Ok(Some(row)) => row,
            Ok(None) => return NO_ACCESS,
            Err(e) => {
                tracing::warn!(error = %e, "Access level lookup failed");
                return NO_ACCESS;
            }
        };
        scalar(&row, 0)
            .as_ref()
            .and_then(to_level)
            .unwrap_or(NO_ACCESS)
    }
}
