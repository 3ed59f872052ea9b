//! Parameterized SQL builder.
//!
//! Builders render to a [`Statement`]: SQL text with placeholders plus the
//! ordered values to bind. Values never appear in the SQL text.
//! Identifiers are validated instead of quoted.

mod condition;
mod delete;
mod error;
mod ident;
mod insert;
mod select;
mod statement;
mod update;
mod value;

pub use condition::Condition;
pub use delete::Delete;
pub use error::QueryError;
pub use insert::Insert;
pub use select::{JoinKind, Order, Select};
pub use statement::{Placeholder, Statement};
pub use update::Update;
pub use value::SqlValue;

/// Checks that `name` can be used as a table or column name.
pub fn validate_identifier(name: &str) -> Result<&str, QueryError> {
    ident::validate_column(name)
}
