//! Authentication domain module.
//!
//! Provider-agnostic types for the auth gate: the status state machine,
//! submitted credentials, the identity an adapter resolves, and the record
//! persisted in the visitor's session between requests.

mod errors;
mod identity;
mod record;
mod status;

pub use errors::ConfigurationError;
pub use identity::{AuthIdentity, Credentials};
pub use record::{
    AuthRecord, AUTH_SESSION_KEY, MSG_AUTH_FAILED, MSG_AUTH_SUCCESS, MSG_LOGGED_OUT,
};
pub use status::AuthStatus;
