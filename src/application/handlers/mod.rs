//! Command handlers.

pub mod auth;
