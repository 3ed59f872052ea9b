//! INSERT builder.

use super::statement::SqlWriter;
use super::{Placeholder, QueryError, SqlValue, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: String,
    values: Vec<(String, SqlValue)>,
    returning: Vec<String>,
}

impl Insert {
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
            returning: Vec::new(),
        }
    }

    pub fn value(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Adds a `RETURNING` column (PostgreSQL).
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning.push(column.into());
        self
    }

    pub fn build(&self, style: Placeholder) -> Result<Statement, QueryError> {
        if self.values.is_empty() {
            return Err(QueryError::EmptyInsert(self.table.clone()));
        }

        let mut w = SqlWriter::new(style);
        w.push("INSERT INTO ");
        w.push_column(&self.table)?;
        w.push(" (");
        for (i, (column, _)) in self.values.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_column(column)?;
        }
        w.push(") VALUES (");
        for (i, (_, value)) in self.values.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_param(value.clone());
        }
        w.push(")");

        for (i, column) in self.returning.iter().enumerate() {
            w.push(if i == 0 { " RETURNING " } else { ", " });
            w.push_ident(column)?;
        }

        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_columns_and_placeholders_in_order() {
        let stmt = Insert::into("users")
            .value("username", "alice")
            .value("level", 2)
            .value("email", None::<String>)
            .returning("id")
            .build(Placeholder::Dollar)
            .unwrap();

        assert_eq!(
            stmt.sql,
            "INSERT INTO users (username, level, email) VALUES ($1, $2, $3) RETURNING id"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::Text("alice".into()), SqlValue::Int(2), SqlValue::Null]
        );
    }

    #[test]
    fn empty_insert_is_an_error() {
        let err = Insert::into("users").build(Placeholder::Dollar).unwrap_err();
        assert_eq!(err, QueryError::EmptyInsert("users".into()));
    }

    #[test]
    fn question_style_for_other_databases() {
        let stmt = Insert::into("t")
            .value("a", 1)
            .build(Placeholder::Question)
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO t (a) VALUES (?)");
    }
}
