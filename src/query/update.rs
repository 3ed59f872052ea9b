//! UPDATE builder.

use super::statement::SqlWriter;
use super::{Condition, Placeholder, QueryError, SqlValue, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: String,
    assignments: Vec<(String, SqlValue)>,
    filters: Vec<Condition>,
}

impl Update {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn build(&self, style: Placeholder) -> Result<Statement, QueryError> {
        if self.assignments.is_empty() {
            return Err(QueryError::EmptyUpdate(self.table.clone()));
        }

        let mut w = SqlWriter::new(style);
        w.push("UPDATE ");
        w.push_column(&self.table)?;
        w.push(" SET ");
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_column(column)?;
            w.push(" = ");
            w.push_param(value.clone());
        }
        w.push_filters(&self.filters)?;
        Ok(w.finish())
    }
}
