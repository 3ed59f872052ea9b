//! DELETE builder.

use super::statement::SqlWriter;
use super::{Condition, Placeholder, QueryError, Statement};

/// DELETE builder. Refuses to render without a filter unless
/// [`Delete::all_rows`] was called.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: String,
    filters: Vec<Condition>,
    all_rows: bool,
}

impl Delete {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            all_rows: false,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    pub fn build(&self, style: Placeholder) -> Result<Statement, QueryError> {
        if self.filters.is_empty() && !self.all_rows {
            return Err(QueryError::UnfilteredDelete(self.table.clone()));
        }

        let mut w = SqlWriter::new(style);
        w.push("DELETE FROM ");
        w.push_column(&self.table)?;
        w.push_filters(&self.filters)?;
        Ok(w.finish())
    }
}
