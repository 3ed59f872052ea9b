//! Credentials submitted by a visitor and the identity an adapter resolves.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccessLevel, AuthId};

/// Credentials handed to an adapter's `check_credentials`.
///
/// Secrets stay wrapped so they never end up in `Debug` output or logs.
#[derive(Debug)]
pub enum Credentials {
    /// Username and password, as posted by the sign-in form.
    Password {
        username: String,
        password: SecretString,
    },
    /// A bearer token (JWT).
    Token(SecretString),
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token(SecretString::new(token.into()))
    }

    /// Builds credentials from the sign-in form's `user` and `pass` fields.
    ///
    /// Surrounding whitespace is stripped from the username only.
    pub fn from_form(user: &str, pass: &str) -> Self {
        Self::password(user.trim(), pass)
    }

    /// Username for logging; `None` for token credentials.
    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::Password { username, .. } => Some(username),
            Credentials::Token(_) => None,
        }
    }

    /// Returns true if the secret part is empty.
    pub fn is_blank(&self) -> bool {
        match self {
            Credentials::Password { username, password } => {
                username.is_empty() || password.expose_secret().is_empty()
            }
            Credentials::Token(token) => token.expose_secret().trim().is_empty(),
        }
    }
}

/// What an adapter learned about a user when it accepted their credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: AuthId,
    /// Level captured at check time (token claim, directory setting).
    /// Adapters that look the level up on demand leave this empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AccessLevel>,
}

impl AuthIdentity {
    pub fn new(id: impl Into<AuthId>) -> Self {
        Self {
            id: id.into(),
            level: None,
        }
    }

    pub fn with_level(mut self, level: AccessLevel) -> Self {
        self.level = Some(level);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_form_trims_username_but_not_password() {
        let creds = Credentials::from_form("  alice ", " secret ");
        match creds {
            Credentials::Password { username, password } => {
                assert_eq!(username, "alice");
                assert_eq!(password.expose_secret(), " secret ");
            }
            Credentials::Token(_) => panic!("expected password credentials"),
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::password("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn blank_detection() {
        assert!(Credentials::password("alice", "").is_blank());
        assert!(Credentials::password("", "pw").is_blank());
        assert!(Credentials::token("   ").is_blank());
        assert!(!Credentials::password("alice", "pw").is_blank());
    }

    #[test]
    fn username_only_for_password_credentials() {
        assert_eq!(Credentials::password("bob", "x").username(), Some("bob"));
        assert_eq!(Credentials::token("abc").username(), None);
    }

    #[test]
    fn identity_level_is_optional_in_json() {
        let identity = AuthIdentity::new("u-1");
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, r#"{"id":"u-1"}"#);

        let with_level = AuthIdentity::new("u-1").with_level(3);
        let back: AuthIdentity =
            serde_json::from_str(&serde_json::to_string(&with_level).unwrap()).unwrap();
        assert_eq!(back.level, Some(3));
    }
}
