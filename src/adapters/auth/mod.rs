//! Authentication adapters.
//!
//! Implementations of the `AuthAdapter` port:
//!
//! - `mock` - Fixed users, no backend (tests and local development)
//! - `database` - Users table with bcrypt hashes
//! - `directory` - LDAP / Active Directory simple bind
//! - `token` - Bearer JWTs (shared secret, PEM key or JWKS)
//! - `disabled` - Bound when authentication is switched off
//!
//! `registry` resolves the configured identifier to one of these.

mod database;
mod directory;
mod disabled;
mod mock;
mod registry;
mod token;

pub use database::{DatabaseAuthAdapter, DATABASE_ADAPTER_ID};
pub use directory::{DirectoryAuthAdapter, DIRECTORY_ADAPTER_ID};
pub use disabled::{DisabledAdapter, DISABLED_ADAPTER_ID};
pub use mock::{MockAuthAdapter, MOCK_ADAPTER_ID};
pub use registry::{AdapterFactory, AdapterRegistry, AdapterResources};
pub use token::{TokenAuthAdapter, TOKEN_ADAPTER_ID};
