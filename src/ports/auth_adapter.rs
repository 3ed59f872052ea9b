//! Auth adapter port - the credential-checking strategy behind the gate.
//!
//! Every backing identity source (database table, directory service, token
//! issuer) implements this trait. The auth context binds exactly one adapter
//! at a time and never talks to a backend directly.
//!
//! # Contract
//!
//! Implementations must:
//! - Return `CredentialCheck::Rejected` for wrong passwords, failed binds and
//!   invalid tokens. These are expected outcomes, never errors.
//! - Return `AdapterError::Misconfigured` only for settings problems
//! - Return `AdapterError::Unavailable` when the backend cannot be reached
//! - Make exactly one round trip per check, without retries
//! - Return `NO_ACCESS` from `access_level` when a lookup fails

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::auth::{AuthIdentity, Credentials};
use crate::domain::foundation::AccessLevel;
use crate::domain::routing::Route;

/// Outcome of a credential check.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialCheck {
    Accepted(AuthIdentity),
    Rejected,
}

impl CredentialCheck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CredentialCheck::Accepted(_))
    }
}

/// Failures that are not a plain "no".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The adapter's settings are unusable. Fatal.
    #[error("Adapter misconfigured: {0}")]
    Misconfigured(String),

    /// The backing system could not be reached or answered garbage.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl AdapterError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn misconfigured(message: impl Into<String>) -> Self {
        Self::Misconfigured(message.into())
    }
}

/// Credential-checking strategy bound to the auth gate.
#[async_trait]
pub trait AuthAdapter: Send + Sync + std::fmt::Debug {
    /// Registry identifier, persisted with the auth record.
    fn identifier(&self) -> &str;

    /// Checks credentials against the backing identity source.
    async fn check_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<CredentialCheck, AdapterError>;

    /// Access level for an identity this adapter accepted earlier.
    async fn access_level(&self, identity: &AuthIdentity) -> AccessLevel;

    /// Drops any adapter-local state tied to the identity.
    async fn reset(&self, _identity: Option<&AuthIdentity>) -> bool {
        true
    }

    /// Lets an adapter veto a route beyond the plain level comparison.
    async fn authorize_route(
        &self,
        _route: &Route,
        _required_level: AccessLevel,
        _identity: &AuthIdentity,
    ) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DEFAULT_ACCESS;

    /// Minimal adapter that relies on the default hooks.
    #[derive(Debug)]
    struct AcceptEverything;

    #[async_trait]
    impl AuthAdapter for AcceptEverything {
        fn identifier(&self) -> &str {
            "accept-everything"
        }

        async fn check_credentials(
            &self,
            credentials: &Credentials,
        ) -> Result<CredentialCheck, AdapterError> {
            Ok(CredentialCheck::Accepted(AuthIdentity::new(
                credentials.username().unwrap_or("token"),
            )))
        }

        async fn access_level(&self, _identity: &AuthIdentity) -> AccessLevel {
            DEFAULT_ACCESS
        }
    }

    #[tokio::test]
    async fn default_hooks_allow() {
        let adapter = AcceptEverything;
        let identity = AuthIdentity::new("u");
        let route = Route::parse("/admin/index").unwrap();

        assert!(adapter.reset(Some(&identity)).await);
        assert!(adapter.authorize_route(&route, 5, &identity).await);
    }

    #[tokio::test]
    async fn accepted_check_carries_identity() {
        let check = AcceptEverything
            .check_credentials(&Credentials::password("alice", "pw"))
            .await
            .unwrap();
        assert_eq!(check, CredentialCheck::Accepted(AuthIdentity::new("alice")));
        assert!(check.is_accepted());
    }

    #[test]
    fn auth_adapter_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn AuthAdapter) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn AuthAdapter>>();
    }
}
