//! Feature flags configuration

use serde::Deserialize;

/// Runtime switches.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Include error details in error pages (developer mode)
    #[serde(default)]
    pub verbose_errors: bool,

    /// Trace HTTP requests
    #[serde(default = "default_enable_tracing")]
    pub enable_tracing: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            verbose_errors: false,
            enable_tracing: default_enable_tracing(),
        }
    }
}

fn default_enable_tracing() -> bool {
    true
}
