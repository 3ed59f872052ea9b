//! Adapter bound when authentication is switched off.

use async_trait::async_trait;

use crate::domain::auth::{AuthIdentity, Credentials};
use crate::domain::foundation::{AccessLevel, NO_ACCESS};
use crate::ports::{AdapterError, AuthAdapter, CredentialCheck};

pub const DISABLED_ADAPTER_ID: &str = "disabled";

/// Rejects every credential. Guarded routes are opened by the route
/// policy, not by this adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAdapter;

#[async_trait]
impl AuthAdapter for DisabledAdapter {
    fn identifier(&self) -> &str {
        DISABLED_ADAPTER_ID
    }

    async fn check_credentials(
        &self,
        _credentials: &Credentials,
    ) -> Result<CredentialCheck, AdapterError> {
        Ok(CredentialCheck::Rejected)
    }

    async fn access_level(&self, _identity: &AuthIdentity) -> AccessLevel {
        NO_ACCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_everything() {
        let adapter = DisabledAdapter;
        assert_eq!(
            adapter
                .check_credentials(&Credentials::password("alice", "pw"))
                .await
                .unwrap(),
            CredentialCheck::Rejected
        );
        assert_eq!(adapter.access_level(&AuthIdentity::new("alice")).await, NO_ACCESS);
    }
}
