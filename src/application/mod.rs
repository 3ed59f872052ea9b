//! Application layer - request-scoped auth state, session lifecycle and
//! the sign-in command handlers.
//!
//! This layer coordinates domain types with the `AuthAdapter` and
//! `SessionStore` ports. It owns no I/O of its own.

mod auth_context;
mod errors;
pub mod handlers;
mod session_manager;
mod session_sweeper;

pub use auth_context::{AuthContext, AuthOutcome};
pub use errors::AuthError;
pub use handlers::auth::{SignInCommand, SignInHandler, SignInResult, SignOutHandler};
pub use session_manager::SessionManager;
pub use session_sweeper::SessionSweeper;
