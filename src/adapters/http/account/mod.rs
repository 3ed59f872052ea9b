//! Sign-in surface: form, submission, sign-out and status.

mod dto;
mod handlers;
mod routes;

pub use dto::{AuthStatusResponse, SignInForm};
pub use routes::account_router;
