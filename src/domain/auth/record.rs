//! Persisted authentication state.

use serde::{Deserialize, Serialize};

use super::{AuthIdentity, AuthStatus};
use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::routing::Route;

/// Session key the auth record is stored under.
pub const AUTH_SESSION_KEY: &str = "Staple_Auth";

pub const MSG_AUTH_SUCCESS: &str = "Authentication Successful";
pub const MSG_AUTH_FAILED: &str = "Authentication Failed";
pub const MSG_LOGGED_OUT: &str = "Logged Out";

/// Authentication state carried between requests inside the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub status: AuthStatus,
    pub message: String,
    /// Identifier of the adapter that produced `identity`.
    pub adapter: String,
    #[serde(default)]
    pub identity: Option<AuthIdentity>,
    #[serde(default)]
    pub last_attempted_route: Option<Route>,
    /// Set while credentials from the current request are being processed.
    #[serde(skip)]
    pub submitted: bool,
}

impl AuthRecord {
    /// Fresh anonymous record bound to `adapter`.
    pub fn anonymous(adapter: impl Into<String>) -> Self {
        Self {
            status: AuthStatus::Anonymous,
            message: String::new(),
            adapter: adapter.into(),
            identity: None,
            last_attempted_route: None,
            submitted: false,
        }
    }

    pub fn is_authed(&self) -> bool {
        self.status.is_authenticated()
    }

    /// Moves to `Authenticating` for a credential check.
    pub fn begin_check(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(AuthStatus::Authenticating)?;
        self.submitted = true;
        Ok(())
    }

    /// Completes a check with the identity the adapter resolved.
    pub fn accept(&mut self, identity: AuthIdentity, message: &str) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(AuthStatus::Authenticated)?;
        self.message = message.to_string();
        self.identity = Some(identity);
        self.last_attempted_route = None;
        Ok(())
    }

    /// Drops authentication while keeping the route breadcrumb.
    ///
    /// Every status may fall back to `Anonymous`; an anonymous record only
    /// gets the new message.
    pub fn sign_out(&mut self, message: &str) {
        if let Ok(next) = self.status.transition_to(AuthStatus::Anonymous) {
            self.status = next;
        }
        self.message = message.to_string();
        self.identity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_record_has_empty_message() {
        let record = AuthRecord::anonymous("mock");
        assert!(!record.is_authed());
        assert_eq!(record.message, "");
        assert_eq!(record.adapter, "mock");
    }

    #[test]
    fn submitted_flag_is_not_persisted() {
        let mut record = AuthRecord::anonymous("mock");
        record.submitted = true;

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("submitted").is_none());

        let back: AuthRecord = serde_json::from_value(json).unwrap();
        assert!(!back.submitted);
    }

    #[test]
    fn sign_out_keeps_breadcrumb() {
        let mut record = AuthRecord::anonymous("mock");
        record.status = AuthStatus::Authenticated;
        record.identity = Some(AuthIdentity::new("u"));
        record.last_attempted_route = Some(Route::parse("/report/view").unwrap());

        record.sign_out(MSG_LOGGED_OUT);

        assert!(!record.is_authed());
        assert!(record.identity.is_none());
        assert_eq!(record.message, MSG_LOGGED_OUT);
        assert!(record.last_attempted_route.is_some());
    }

    #[test]
    fn check_moves_through_authenticating() {
        let mut record = AuthRecord::anonymous("mock");
        record.last_attempted_route = Some(Route::parse("/report/view").unwrap());

        record.begin_check().unwrap();
        assert_eq!(record.status, AuthStatus::Authenticating);
        assert!(record.submitted);

        record.accept(AuthIdentity::new("u"), MSG_AUTH_SUCCESS).unwrap();
        assert!(record.is_authed());
        assert!(record.last_attempted_route.is_none());
    }

    #[test]
    fn accept_without_a_check_is_refused() {
        let mut record = AuthRecord::anonymous("mock");
        assert!(record.accept(AuthIdentity::new("u"), MSG_AUTH_SUCCESS).is_err());
        assert!(!record.is_authed());
        assert!(record.identity.is_none());

        record.begin_check().unwrap();
        assert!(record.begin_check().is_err());
    }

    #[test]
    fn sign_out_from_any_status_ends_anonymous() {
        for status in [
            AuthStatus::Anonymous,
            AuthStatus::Authenticating,
            AuthStatus::Authenticated,
        ] {
            let mut record = AuthRecord::anonymous("mock");
            record.status = status;
            record.sign_out(MSG_AUTH_FAILED);
            assert_eq!(record.status, AuthStatus::Anonymous);
            assert_eq!(record.message, MSG_AUTH_FAILED);
        }
    }
}
