//! HTTP middleware for axum.
//!
//! - `session` - Loads and commits the visitor's session
//! - `require_auth` - Redirects visitors who are not signed in

mod require_auth;
mod session;

pub use require_auth::require_auth;
pub use session::{session_layer, SessionHandle};
