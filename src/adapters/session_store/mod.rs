//! Session store adapters.
//!
//! Implementations of the `SessionStore` port:
//!
//! - `in_memory` - Process-local map (tests, single server)
//! - `file` - One YAML file per session
//! - `redis` - JSON strings with native expiry
//! - `postgres` - A `sessions` table

mod file;
mod in_memory;
mod postgres;
mod redis;

pub use file::FileSessionStore;
pub use in_memory::InMemorySessionStore;
pub use postgres::{PostgresSessionStore, DEFAULT_SESSIONS_TABLE};
pub use self::redis::RedisSessionStore;
