//! Configuration errors raised while binding an adapter.

use thiserror::Error;

/// Fatal adapter configuration problems. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No factory is registered under the configured adapter identifier.
    #[error("Unknown auth adapter '{0}'")]
    UnknownAdapter(String),

    /// A required setting for the selected adapter is absent or empty.
    #[error("Missing auth setting: {0}")]
    MissingSetting(String),

    /// A setting is present but unusable.
    #[error("Invalid auth setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// The adapter reported it cannot operate with its settings.
    #[error("Auth adapter '{adapter}' is misconfigured: {reason}")]
    AdapterMisconfigured { adapter: String, reason: String },
}

impl ConfigurationError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingSetting(key.into())
    }

    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
