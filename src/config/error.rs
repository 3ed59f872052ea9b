//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Session TTL must be positive")]
    InvalidSessionTtl,

    #[error("Session purge interval must be positive")]
    InvalidPurgeInterval,

    #[error("Invalid session cookie name")]
    InvalidCookieName,

    #[error("Session cookie secret must be at least {min} bytes in production")]
    CookieSecretTooShort { min: usize },

    #[error("Session backend '{backend}' requires the [{section}] section")]
    BackendRequires {
        backend: &'static str,
        section: &'static str,
    },

    #[error("Invalid route for {key}: {reason}")]
    InvalidRoute { key: &'static str, reason: String },

    #[error("The mock auth adapter cannot be used in production")]
    MockAdapterInProduction,
}
