//! Rendered statements and the shared SQL writer.

use std::fmt;
use std::fmt::Write as _;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use super::condition::Condition;
use super::{ident, QueryError, SqlValue};

/// Placeholder syntax of the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1, $2, ...` (PostgreSQL)
    #[default]
    Dollar,
    /// `?` (MySQL, SQLite)
    Question,
}

/// SQL text plus the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Prepares the statement for sqlx with every param bound.
    pub fn bind_postgres(&self) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Text(s) => query.bind(s.as_str()),
            };
        }
        query
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

pub(crate) struct SqlWriter {
    sql: String,
    params: Vec<SqlValue>,
    style: Placeholder,
}

impl SqlWriter {
    pub(crate) fn new(style: Placeholder) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            style,
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn push_ident(&mut self, name: &str) -> Result<(), QueryError> {
        let name = ident::validate(name)?;
        self.sql.push_str(name);
        Ok(())
    }

    pub(crate) fn push_column(&mut self, name: &str) -> Result<(), QueryError> {
        let name = ident::validate_column(name)?;
        self.sql.push_str(name);
        Ok(())
    }

    pub(crate) fn push_param(&mut self, value: SqlValue) {
        self.params.push(value);
        match self.style {
            Placeholder::Dollar => {
                let _ = write!(self.sql, "${}", self.params.len());
            }
            Placeholder::Question => self.sql.push('?'),
        }
    }

    /// Copies a raw fragment, turning each `?` into a bound placeholder.
    pub(crate) fn push_raw(&mut self, text: &str, params: &[SqlValue]) -> Result<(), QueryError> {
        let expected = text.matches('?').count();
        if expected != params.len() {
            return Err(QueryError::RawParamMismatch {
                expected,
                actual: params.len(),
            });
        }
        let mut values = params.iter().cloned();
        for ch in text.chars() {
            if ch != '?' {
                self.sql.push(ch);
            } else if let Some(value) = values.next() {
                self.push_param(value);
            }
        }
        Ok(())
    }

    /// Writes ` WHERE a AND b ...` when there are filters.
    pub(crate) fn push_filters(&mut self, filters: &[Condition]) -> Result<(), QueryError> {
        for (i, condition) in filters.iter().enumerate() {
            self.push(if i == 0 { " WHERE " } else { " AND " });
            condition.render(self)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}
