//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the auth gate to external systems:
//! - `auth` - Credential checkers (mock, database, directory, token) and their registry
//! - `session_store` - Session persistence (memory, files, Redis, PostgreSQL)
//! - `http` - The axum sign-in surface

pub mod auth;
pub mod http;
pub mod session_store;
