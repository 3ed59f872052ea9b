//! HTTP adapter - the sign-in surface on axum.
//!
//! - `cookie` - Signed session cookie
//! - `middleware` - Session loading/commit and the auth guard
//! - `account` - Sign-in, sign-out and status endpoints
//! - `error` - Error pages

pub mod account;
pub mod cookie;
pub mod error;
pub mod middleware;
mod router;
mod state;

pub use cookie::SessionCookie;
pub use error::ErrorPage;
pub use middleware::{require_auth, session_layer, SessionHandle};
pub use router::app_router;
pub use state::AppState;
