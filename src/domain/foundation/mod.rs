//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the access level type, the state machine trait
//! and validation errors used across the auth, routing and session modules.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::{AuthId, SessionId};
pub use state_machine::StateMachine;

/// Coarse-grained role tier returned by adapters. `0` means no access.
pub type AccessLevel = u32;

/// Level every failure path falls back to.
pub const NO_ACCESS: AccessLevel = 0;

/// Level granted when an adapter has no role system configured.
pub const DEFAULT_ACCESS: AccessLevel = 1;
