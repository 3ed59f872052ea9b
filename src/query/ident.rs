//! Identifier validation.
//!
//! Table and column names are interpolated into SQL text, so they are
//! restricted to plain identifiers, optionally dotted (`schema.table`,
//! `t.column`). `*` is allowed on its own or as the last dotted part.

use super::QueryError;

pub(crate) fn validate(ident: &str) -> Result<&str, QueryError> {
    let ident = ident.trim();
    if ident.is_empty() {
        return Err(QueryError::InvalidIdentifier(ident.to_string()));
    }

    let parts: Vec<&str> = ident.split('.').collect();
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        let ok = if *part == "*" {
            i == last
        } else {
            is_plain(part)
        };
        if !ok {
            return Err(QueryError::InvalidIdentifier(ident.to_string()));
        }
    }
    Ok(ident)
}

/// Validates a non-wildcard identifier (tables, assignment targets).
pub(crate) fn validate_column(ident: &str) -> Result<&str, QueryError> {
    let ident = validate(ident)?;
    if ident.ends_with('*') {
        return Err(QueryError::InvalidIdentifier(ident.to_string()));
    }
    Ok(ident)
}

fn is_plain(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
