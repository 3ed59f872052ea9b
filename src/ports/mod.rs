//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the auth gate and the outside world. Adapters implement these ports.
//!
//! - `AuthAdapter` - Checks credentials against one identity source
//! - `SessionStore` - Persists visitor sessions between requests

mod auth_adapter;
mod session_store;

pub use auth_adapter::{AdapterError, AuthAdapter, CredentialCheck};
pub use session_store::{SessionStore, SessionStoreError};
