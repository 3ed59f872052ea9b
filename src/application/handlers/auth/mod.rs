//! Sign-in surface command handlers.

mod sign_in;
mod sign_out;

pub use sign_in::{SignInCommand, SignInHandler, SignInResult};
pub use sign_out::SignOutHandler;
