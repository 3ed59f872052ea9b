//! Authentication configuration
//!
//! `adapter` names the registry entry to bind. Each built-in adapter reads
//! its own optional section; the registry reports a missing section as a
//! configuration error when that adapter is selected.

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::foundation::{AccessLevel, DEFAULT_ACCESS};
use crate::domain::routing::RoutePolicy;

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// When false, guarded routes are served without signing in
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Registry identifier of the adapter to bind
    #[serde(default)]
    pub adapter: String,

    #[serde(default = "default_unauthenticated_route")]
    pub unauthenticated_route: String,

    #[serde(default = "default_index_route")]
    pub index_route: String,

    #[serde(default)]
    pub mock: Option<MockAuthSettings>,

    #[serde(default)]
    pub database: Option<DatabaseAuthSettings>,

    #[serde(default)]
    pub directory: Option<DirectoryAuthSettings>,

    #[serde(default)]
    pub token: Option<TokenAuthSettings>,
}

/// Users for the mock adapter, `name:password[:level]` separated by commas.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MockAuthSettings {
    #[serde(default)]
    pub users: String,
}

/// Users table lookup.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseAuthSettings {
    #[serde(default)]
    pub authtable: String,
    #[serde(default)]
    pub uidfield: String,
    /// Column holding a bcrypt hash
    #[serde(default)]
    pub pwfield: String,
    /// Column holding the numeric access level
    #[serde(default)]
    pub rolefield: Option<String>,
}

/// LDAP / Active Directory simple bind.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryAuthSettings {
    #[serde(default)]
    pub url: String,
    /// DN with a `{username}` placeholder, e.g. `uid={username},ou=people,dc=example,dc=org`
    #[serde(default)]
    pub bind_dn_template: String,
    #[serde(default)]
    pub start_tls: bool,
    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_level")]
    pub default_level: AccessLevel,
}

/// Bearer token (JWT) validation.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAuthSettings {
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    /// Comma-separated, e.g. `RS256,ES256`
    #[serde(default = "default_algorithms")]
    pub algorithms: String,
    /// Shared key for HS* algorithms
    #[serde(default)]
    pub secret: Option<SecretString>,
    #[serde(default)]
    pub public_key_pem: Option<String>,
    #[serde(default)]
    pub jwks_url: Option<String>,
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
    #[serde(default = "default_uid_claim")]
    pub uid_claim: String,
    #[serde(default)]
    pub level_claim: Option<String>,
}

impl AuthConfig {
    /// Loop guard and redirect targets for the auth context.
    pub fn route_policy(&self) -> Result<RoutePolicy, ValidationError> {
        RoutePolicy::from_paths(self.enabled, &self.unauthenticated_route, &self.index_route)
            .map_err(|e| ValidationError::InvalidRoute {
                key: "AUTH__UNAUTHENTICATED_ROUTE / AUTH__INDEX_ROUTE",
                reason: e.to_string(),
            })
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        self.route_policy()?;
        if !self.enabled {
            return Ok(());
        }
        if self.adapter.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ADAPTER"));
        }
        if *environment == Environment::Production && self.adapter == "mock" {
            return Err(ValidationError::MockAdapterInProduction);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            adapter: String::new(),
            unauthenticated_route: default_unauthenticated_route(),
            index_route: default_index_route(),
            mock: None,
            database: None,
            directory: None,
            token: None,
        }
    }
}

impl DirectoryAuthSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DirectoryAuthSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            bind_dn_template: String::new(),
            start_tls: false,
            timeout_secs: default_directory_timeout(),
            default_level: default_level(),
        }
    }
}

impl TokenAuthSettings {
    pub fn algorithm_names(&self) -> Vec<String> {
        self.algorithms
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }
}

impl Default for TokenAuthSettings {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            audience: String::new(),
            algorithms: default_algorithms(),
            secret: None,
            public_key_pem: None,
            jwks_url: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
            uid_claim: default_uid_claim(),
            level_claim: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_unauthenticated_route() -> String {
    "/account/signin".to_string()
}

fn default_index_route() -> String {
    "/index/index".to_string()
}

fn default_directory_timeout() -> u64 {
    5
}

fn default_level() -> AccessLevel {
    DEFAULT_ACCESS
}

fn default_algorithms() -> String {
    "RS256".to_string()
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

fn default_uid_claim() -> String {
    "sub".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_adapter(adapter: &str) -> AuthConfig {
        AuthConfig {
            adapter: adapter.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn default_routes_build_default_policy() {
        let policy = with_adapter("database").route_policy().unwrap();
        assert_eq!(policy, RoutePolicy::default());
    }

    #[test]
    fn enabled_auth_requires_an_adapter() {
        assert_eq!(
            AuthConfig::default().validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__ADAPTER"))
        );
        let disabled = AuthConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(disabled.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn mock_adapter_is_refused_in_production() {
        let config = with_adapter("mock");
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::MockAdapterInProduction)
        );
    }

    #[test]
    fn invalid_route_fails_validation() {
        let config = AuthConfig {
            index_route: "/home page".to_string(),
            ..with_adapter("database")
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidRoute { .. })
        ));
    }

    #[test]
    fn token_algorithm_list_is_split_and_trimmed() {
        let settings = TokenAuthSettings {
            algorithms: "RS256, ES256,,".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.algorithm_names(), vec!["RS256", "ES256"]);
        assert_eq!(settings.jwks_cache_ttl(), Duration::from_secs(3600));
    }
}
