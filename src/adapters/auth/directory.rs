//! Directory auth adapter - LDAP / Active Directory simple bind.
//!
//! A successful bind as the user's DN is the credential check. Nothing is
//! searched and no service account is needed.

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings};
use secrecy::ExposeSecret;

use crate::config::DirectoryAuthSettings;
use crate::domain::auth::{AuthIdentity, ConfigurationError, Credentials};
use crate::domain::foundation::AccessLevel;
use crate::ports::{AdapterError, AuthAdapter, CredentialCheck};

pub const DIRECTORY_ADAPTER_ID: &str = "directory";

const USERNAME_PLACEHOLDER: &str = "{username}";

/// LDAP result code for a failed bind.
const RC_INVALID_CREDENTIALS: u32 = 49;

#[derive(Debug, Clone)]
pub struct DirectoryAuthAdapter {
    settings: DirectoryAuthSettings,
}

impl DirectoryAuthAdapter {
    pub fn new(settings: &DirectoryAuthSettings) -> Result<Self, ConfigurationError> {
        if settings.url.trim().is_empty() {
            return Err(ConfigurationError::missing("auth.directory.url"));
        }
        if !settings.url.starts_with("ldap://") && !settings.url.starts_with("ldaps://") {
            return Err(ConfigurationError::invalid(
                "auth.directory.url",
                "expected an ldap:// or ldaps:// URL",
            ));
        }
        if !settings.bind_dn_template.contains(USERNAME_PLACEHOLDER) {
            return Err(ConfigurationError::invalid(
                "auth.directory.bind_dn_template",
                format!("must contain {}", USERNAME_PLACEHOLDER),
            ));
        }
        if settings.timeout_secs == 0 {
            return Err(ConfigurationError::invalid(
                "auth.directory.timeout_secs",
                "must be positive",
            ));
        }
        Ok(Self {
            settings: settings.clone(),
        })
    }

    /// DN to bind as, with the username escaped for DN syntax.
    fn bind_dn(&self, username: &str) -> String {
        self.settings
            .bind_dn_template
            .replace(USERNAME_PLACEHOLDER, &ldap3::dn_escape(username))
    }

    fn connection_settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.settings.timeout())
            .set_starttls(self.settings.start_tls)
    }
}

#[async_trait]
impl AuthAdapter for DirectoryAuthAdapter {
    fn identifier(&self) -> &str {
        DIRECTORY_ADAPTER_ID
    }

    async fn check_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<CredentialCheck, AdapterError> {
        let Credentials::Password { username, password } = credentials else {
            return Ok(CredentialCheck::Rejected);
        };
        // an empty password turns into an unauthenticated bind, which succeeds
        if credentials.is_blank() {
            return Ok(CredentialCheck::Rejected);
        }

        let (conn, mut ldap) =
            LdapConnAsync::with_settings(self.connection_settings(), &self.settings.url)
                .await
                .map_err(|e| AdapterError::unavailable(format!("directory connect failed: {}", e)))?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::debug!(error = %e, "Directory connection closed with error");
            }
        });

        let dn = self.bind_dn(username);
        let result = ldap
            .with_timeout(self.settings.timeout())
            .simple_bind(&dn, password.expose_secret())
            .await
            .map_err(|e| AdapterError::unavailable(format!("directory bind failed: {}", e)));
        let _ = ldap.unbind().await;
        let result = result?;

        match result.rc {
            0 => Ok(CredentialCheck::Accepted(
                AuthIdentity::new(username.as_str()).with_level(self.settings.default_level),
            )),
            RC_INVALID_CREDENTIALS => Ok(CredentialCheck::Rejected),
            rc => Err(AdapterError::unavailable(format!(
                "directory answered rc={} ({})",
                rc, result.text
            ))),
        }
    }

    async fn access_level(&self, identity: &AuthIdentity) -> AccessLevel {
        identity.level.unwrap_or(self.settings.default_level)
    }
}
