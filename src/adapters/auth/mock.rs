//! Mock auth adapter for tests and local development.
//!
//! Accepts a fixed set of username/password pairs and bearer tokens without
//! talking to any backend.
//!
//! # Example
//!
//! ```ignore
//! use staple::adapters::auth::MockAuthAdapter;
//!
//! let adapter = MockAuthAdapter::new()
//!     .with_user("testusername", "test&P@ssword")
//!     .with_level("testusername", 3);
//! ```

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::config::MockAuthSettings;
use crate::domain::auth::{AuthIdentity, ConfigurationError, Credentials};
use crate::domain::foundation::{AccessLevel, AuthId, DEFAULT_ACCESS, NO_ACCESS};
use crate::ports::{AdapterError, AuthAdapter, CredentialCheck};

pub const MOCK_ADAPTER_ID: &str = "mock";

#[derive(Debug)]
struct MockUser {
    password: SecretString,
    level: AccessLevel,
}

/// In-memory credential checker.
///
/// The `AuthId` it records is the credential object `{"username": ..}`.
#[derive(Debug, Default)]
pub struct MockAuthAdapter {
    users: RwLock<HashMap<String, MockUser>>,
    /// bearer token -> username
    tokens: RwLock<HashMap<String, String>>,
    /// Returned from every check when set
    force_error: RwLock<Option<AdapterError>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAuthAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `username` with `password` at the default level.
    pub fn with_user(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.add_user(username, password);
        self
    }

    /// Overrides the level of an already registered user.
    pub fn with_level(self, username: &str, level: AccessLevel) -> Self {
        if let Some(user) = write(&self.users).get_mut(username) {
            user.level = level;
        }
        self
    }

    /// Accepts `token` as a bearer credential for `username`.
    pub fn with_token(self, token: impl Into<String>, username: impl Into<String>) -> Self {
        write(&self.tokens).insert(token.into(), username.into());
        self
    }

    /// Forces every check to fail with `error`.
    pub fn with_error(self, error: AdapterError) -> Self {
        *write(&self.force_error) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *write(&self.force_error) = None;
    }

    /// Registers a user at runtime.
    pub fn add_user(&self, username: impl Into<String>, password: impl Into<String>) {
        write(&self.users).insert(
            username.into(),
            MockUser {
                password: SecretString::new(password.into()),
                level: DEFAULT_ACCESS,
            },
        );
    }

    pub fn remove_user(&self, username: &str) {
        write(&self.users).remove(username);
    }

    pub fn user_count(&self) -> usize {
        read(&self.users).len()
    }

    /// Builds an adapter from `name:password[:level]` entries separated by commas.
    pub fn from_settings(settings: &MockAuthSettings) -> Result<Self, ConfigurationError> {
        let adapter = Self::new();
        for entry in settings.users.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.splitn(3, ':');
            let (Some(name), Some(password)) = (parts.next(), parts.next()) else {
                return Err(ConfigurationError::invalid(
                    "auth.mock.users",
                    format!("expected name:password, got '{}'", entry),
                ));
            };
            if name.is_empty() || password.is_empty() {
                return Err(ConfigurationError::invalid(
                    "auth.mock.users",
                    "name and password must not be empty",
                ));
            }
            adapter.add_user(name, password);
            if let Some(level) = parts.next() {
                let level: AccessLevel = level.parse().map_err(|_| {
                    ConfigurationError::invalid("auth.mock.users", format!("bad level '{}'", level))
                })?;
                if let Some(user) = write(&adapter.users).get_mut(name) {
                    user.level = level;
                }
            }
        }
        Ok(adapter)
    }

    fn identity_for(&self, username: &str) -> AuthIdentity {
        AuthIdentity::new(AuthId::new(json!({ "username": username })))
    }
}

#[async_trait]
impl AuthAdapter for MockAuthAdapter {
    fn identifier(&self) -> &str {
        MOCK_ADAPTER_ID
    }

    async fn check_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<CredentialCheck, AdapterError> {
        if let Some(error) = read(&self.force_error).clone() {
            return Err(error);
        }

        let username = match credentials {
            Credentials::Password { username, password } => {
                let users = read(&self.users);
                let Some(user) = users.get(username) else {
                    return Ok(CredentialCheck::Rejected);
                };
                let matches: bool = user
                    .password
                    .expose_secret()
                    .as_bytes()
                    .ct_eq(password.expose_secret().as_bytes())
                    .into();
                if !matches {
                    return Ok(CredentialCheck::Rejected);
                }
                username.clone()
            }
            Credentials::Token(token) => {
                match read(&self.tokens).get(token.expose_secret()) {
                    Some(username) => username.clone(),
                    None => return Ok(CredentialCheck::Rejected),
                }
            }
        };

        Ok(CredentialCheck::Accepted(self.identity_for(&username)))
    }

    async fn access_level(&self, identity: &AuthIdentity) -> AccessLevel {
        let Some(username) = identity.id.as_value().get("username").and_then(|v| v.as_str())
        else {
            return NO_ACCESS;
        };
        read(&self.users)
            .get(username)
            .map(|user| user.level)
            .unwrap_or(NO_ACCESS)
    }
}
