//! Query builder errors.

use thiserror::Error;

/// Errors raised while rendering a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid join condition: '{0}'")]
    InvalidJoin(String),

    #[error("Raw statement expects {expected} parameters, got {actual}")]
    RawParamMismatch { expected: usize, actual: usize },

    #[error("INSERT into '{0}' has no values")]
    EmptyInsert(String),

    #[error("UPDATE of '{0}' has no assignments")]
    EmptyUpdate(String),

    #[error("DELETE from '{0}' has no filter; call all_rows() to delete everything")]
    UnfilteredDelete(String),
}
