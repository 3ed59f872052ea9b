//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `STAPLE` prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use staple::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod auth;
mod database;
mod error;
mod features;
mod redis;
mod server;
mod session;

pub use auth::{
    AuthConfig, DatabaseAuthSettings, DirectoryAuthSettings, MockAuthSettings, TokenAuthSettings,
};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use session::{SessionBackend, SessionConfig, MIN_COOKIE_SECRET_LEN};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Required by the database adapter and the postgres session backend
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Required by the redis session backend
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    pub session: SessionConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STAPLE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `STAPLE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `STAPLE__AUTH__ADAPTER=database` -> `auth.adapter = "database"`
    /// - `STAPLE__AUTH__DATABASE__AUTHTABLE=users` -> `auth.database.authtable = "users"`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STAPLE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values, including cross-section
    /// requirements such as a session backend needing its connection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = self.server.environment;
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.session.validate(&environment)?;
        self.auth.validate(&environment)?;

        match self.session.backend {
            SessionBackend::Redis if self.redis.is_none() => {
                return Err(ValidationError::BackendRequires {
                    backend: "redis",
                    section: "redis",
                });
            }
            SessionBackend::Postgres if self.database.is_none() => {
                return Err(ValidationError::BackendRequires {
                    backend: "postgres",
                    section: "database",
                });
            }
            _ => {}
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
