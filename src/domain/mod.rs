//! Domain layer containing the auth gate's types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, access level, state machine, errors)
//! - `auth` - Status, credentials, identity and the persisted auth record
//! - `routing` - Route value type and the gate's routing policy
//! - `session` - Server-side visitor session

pub mod auth;
pub mod foundation;
pub mod routing;
pub mod session;
