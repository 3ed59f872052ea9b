//! Session configuration

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum cookie signing key length accepted in production.
pub const MIN_COOKIE_SECRET_LEN: usize = 32;

/// Where sessions are persisted between requests.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    File,
    Redis,
    Postgres,
}

impl SessionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionBackend::Memory => "memory",
            SessionBackend::File => "file",
            SessionBackend::Redis => "redis",
            SessionBackend::Postgres => "postgres",
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,

    /// Idle lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: i64,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// HMAC key for the session cookie
    pub cookie_secret: SecretString,

    /// Directory for the file backend
    #[serde(default = "default_file_dir")]
    pub file_dir: PathBuf,

    /// Seconds between sweeps of expired sessions
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl SessionConfig {
    pub fn new(cookie_secret: impl Into<String>) -> Self {
        Self {
            backend: SessionBackend::default(),
            ttl_secs: default_ttl(),
            cookie_name: default_cookie_name(),
            cookie_secret: SecretString::new(cookie_secret.into()),
            file_dir: default_file_dir(),
            purge_interval_secs: default_purge_interval(),
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs)
    }

    pub fn purge_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.purge_interval_secs)
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.ttl_secs <= 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.purge_interval_secs == 0 {
            return Err(ValidationError::InvalidPurgeInterval);
        }
        let name_ok = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !name_ok {
            return Err(ValidationError::InvalidCookieName);
        }

        let secret = self.cookie_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("SESSION__COOKIE_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ValidationError::CookieSecretTooShort {
                min: MIN_COOKIE_SECRET_LEN,
            });
        }

        if self.backend == SessionBackend::File && self.file_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("SESSION__FILE_DIR"));
        }
        Ok(())
    }
}

fn default_ttl() -> i64 {
    1800
}

fn default_cookie_name() -> String {
    "staple_session".to_string()
}

fn default_file_dir() -> PathBuf {
    PathBuf::from("./var/sessions")
}

fn default_purge_interval() -> u64 {
    300
}
