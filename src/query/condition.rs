//! WHERE-clause conditions. Multiple conditions always combine with AND.

use super::statement::SqlWriter;
use super::{ident, QueryError, SqlValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => " = ",
            CompareOp::NotEq => " <> ",
            CompareOp::Gt => " > ",
            CompareOp::Ge => " >= ",
            CompareOp::Lt => " < ",
            CompareOp::Le => " <= ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Compare {
        column: String,
        op: CompareOp,
        value: SqlValue,
    },
    Like {
        column: String,
        pattern: String,
    },
    Null {
        column: String,
        negated: bool,
    },
    In {
        column: String,
        values: Vec<SqlValue>,
    },
    Between {
        column: String,
        low: SqlValue,
        high: SqlValue,
    },
    Raw {
        statement: String,
        params: Vec<SqlValue>,
    },
}

/// A single WHERE predicate.
///
/// Column names are validated when the statement is built, not here, so
/// conditions can be assembled freely and fail once at `build()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(Kind);

impl Condition {
    fn compare(column: &str, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Self(Kind::Compare {
            column: column.to_string(),
            op,
            value: value.into(),
        })
    }

    pub fn eq(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    pub fn not_eq(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::NotEq, value)
    }

    pub fn gt(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn ge(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    pub fn lt(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn le(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    /// `column LIKE pattern`. The pattern is bound, wildcards included.
    pub fn like(column: &str, pattern: impl Into<String>) -> Self {
        Self(Kind::Like {
            column: column.to_string(),
            pattern: pattern.into(),
        })
    }

    pub fn is_null(column: &str) -> Self {
        Self(Kind::Null {
            column: column.to_string(),
            negated: false,
        })
    }

    pub fn is_not_null(column: &str) -> Self {
        Self(Kind::Null {
            column: column.to_string(),
            negated: true,
        })
    }

    /// `column IN (...)`. An empty list matches nothing.
    pub fn in_list<I, V>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Self(Kind::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn between(column: &str, low: impl Into<SqlValue>, high: impl Into<SqlValue>) -> Self {
        Self(Kind::Between {
            column: column.to_string(),
            low: low.into(),
            high: high.into(),
        })
    }

    /// Raw SQL fragment with `?` markers for `params`.
    ///
    /// The text is trusted. A literal `?` inside it counts as a marker.
    pub fn raw(statement: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self(Kind::Raw {
            statement: statement.into(),
            params,
        })
    }

    pub(crate) fn render(&self, w: &mut SqlWriter) -> Result<(), QueryError> {
        match &self.0 {
            Kind::Compare { column, op, value } => {
                w.push_column(column)?;
                match (op, value) {
                    // `= NULL` never matches; compare nullness instead
                    (CompareOp::Eq, SqlValue::Null) => w.push(" IS NULL"),
                    (CompareOp::NotEq, SqlValue::Null) => w.push(" IS NOT NULL"),
                    _ => {
                        w.push(op.as_sql());
                        w.push_param(value.clone());
                    }
                }
            }
            Kind::Like { column, pattern } => {
                w.push_column(column)?;
                w.push(" LIKE ");
                w.push_param(SqlValue::Text(pattern.clone()));
            }
            Kind::Null { column, negated } => {
                w.push_column(column)?;
                w.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Kind::In { column, values } => {
                if values.is_empty() {
                    // still validated so a typo fails the build
                    ident::validate_column(column)?;
                    w.push("1 = 0");
                    return Ok(());
                }
                w.push_column(column)?;
                w.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    w.push_param(value.clone());
                }
                w.push(")");
            }
            Kind::Between { column, low, high } => {
                w.push_column(column)?;
                w.push(" BETWEEN ");
                w.push_param(low.clone());
                w.push(" AND ");
                w.push_param(high.clone());
            }
            Kind::Raw { statement, params } => {
                w.push("(");
                w.push_raw(statement, params)?;
                w.push(")");
            }
        }
        Ok(())
    }
}
