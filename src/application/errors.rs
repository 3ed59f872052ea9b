//! Errors surfaced by the auth gate to the dispatch layer.
//!
//! Credential failures are not errors: they come back as
//! `AuthOutcome::Rejected`. What remains is either fatal (configuration),
//! a routing decision (redirect loop) or an infrastructure fault.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::auth::ConfigurationError;
use crate::domain::foundation::ValidationError;
use crate::domain::routing::Route;
use crate::ports::SessionStoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// Adapter or settings are unusable. Never retried.
    #[error("Auth configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Redirecting to sign-in again would revisit the same route.
    #[error("Not authorized: redirect loop at {route}")]
    RedirectLoop { route: Route },

    /// The session or the auth record inside it could not be read or written.
    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),

    /// An auth status change the state machine does not allow.
    #[error("Invalid auth state: {0}")]
    InvalidState(#[from] ValidationError),
}

impl AuthError {
    /// True for errors that indicate a broken deployment rather than a
    /// visitor-specific condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuthError::Configuration(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::RedirectLoop { .. } => StatusCode::FORBIDDEN,
            AuthError::Configuration(_)
            | AuthError::SessionStore(_)
            | AuthError::InvalidState(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::SessionStore(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_errors_are_fatal() {
        assert!(AuthError::from(ConfigurationError::UnknownAdapter("x".into())).is_fatal());
        assert!(!AuthError::RedirectLoop {
            route: Route::new("index", "index").unwrap()
        }
        .is_fatal());
        assert!(!AuthError::from(SessionStoreError::Io("disk".into())).is_fatal());
    }

    #[test]
    fn redirect_loop_is_forbidden() {
        let err = AuthError::RedirectLoop {
            route: Route::new("reports", "monthly").unwrap(),
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Not authorized: redirect loop at /reports/monthly"
        );
    }

    #[test]
    fn infrastructure_errors_are_server_errors() {
        let err = AuthError::from(SessionStoreError::Backend("redis down".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn json_errors_become_session_store_errors() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(
            AuthError::from(json_err),
            AuthError::SessionStore(SessionStoreError::Serialization(_))
        ));
    }
}
