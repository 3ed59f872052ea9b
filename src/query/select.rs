//! SELECT builder.

use super::statement::SqlWriter;
use super::{ident, Condition, Placeholder, QueryError, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    table: String,
    on: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    alias: Option<String>,
}

/// Fluent SELECT builder.
///
/// ```
/// use staple::query::{Condition, Order, Placeholder, Select};
///
/// let stmt = Select::from("users")
///     .columns(["id", "name"])
///     .filter(Condition::eq("active", true))
///     .order_by("name", Order::Asc)
///     .limit(10)
///     .build(Placeholder::Dollar)
///     .unwrap();
///
/// assert_eq!(
///     stmt.sql,
///     "SELECT id, name FROM users WHERE active = $1 ORDER BY name ASC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    columns: Vec<Column>,
    distinct: bool,
    joins: Vec<Join>,
    filters: Vec<Condition>,
    group_by: Vec<String>,
    order_by: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Adds columns to the projection. No columns means `*`.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(|name| Column {
            name: name.into(),
            alias: None,
        }));
        self
    }

    pub fn column_as(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.columns.push(Column {
            name: column.into(),
            alias: Some(alias.into()),
        });
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Joins `table` on an equality of two columns, written `a.x = b.y`.
    pub fn join(mut self, kind: JoinKind, table: impl Into<String>, on: impl Into<String>) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: on.into(),
        });
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(&self, style: Placeholder) -> Result<Statement, QueryError> {
        let mut w = SqlWriter::new(style);
        w.push(if self.distinct { "SELECT DISTINCT " } else { "SELECT " });

        if self.columns.is_empty() {
            w.push("*");
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(&column.name)?;
            if let Some(alias) = &column.alias {
                w.push(" AS ");
                w.push_column(alias)?;
            }
        }

        w.push(" FROM ");
        w.push_column(&self.table)?;

        for join in &self.joins {
            w.push(match join.kind {
                JoinKind::Inner => " INNER JOIN ",
                JoinKind::Left => " LEFT JOIN ",
            });
            w.push_column(&join.table)?;
            w.push(" ON ");
            let (left, right) = join
                .on
                .split_once('=')
                .ok_or_else(|| QueryError::InvalidJoin(join.on.clone()))?;
            let left = ident::validate_column(left)
                .map_err(|_| QueryError::InvalidJoin(join.on.clone()))?;
            let right = ident::validate_column(right)
                .map_err(|_| QueryError::InvalidJoin(join.on.clone()))?;
            w.push(left);
            w.push(" = ");
            w.push(right);
        }

        w.push_filters(&self.filters)?;

        for (i, column) in self.group_by.iter().enumerate() {
            w.push(if i == 0 { " GROUP BY " } else { ", " });
            w.push_column(column)?;
        }

        for (i, (column, order)) in self.order_by.iter().enumerate() {
            w.push(if i == 0 { " ORDER BY " } else { ", " });
            w.push_column(column)?;
            w.push(match order {
                Order::Asc => " ASC",
                Order::Desc => " DESC",
            });
        }

        if let Some(limit) = self.limit {
            w.push(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            w.push(&format!(" OFFSET {}", offset));
        }

        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlValue;

    #[test]
    fn bare_select_uses_star() {
        let stmt = Select::from("users").build(Placeholder::Dollar).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn table_alias_syntax_is_rejected() {
        let err = Select::from("users u")
            .build(Placeholder::Dollar)
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidIdentifier("users u".into()));
    }

    #[test]
    fn full_select_renders_every_clause_in_order() {
        let stmt = Select::from("users")
            .distinct()
            .columns(["users.id", "roles.name"])
            .column_as("users.email", "contact")
            .join(JoinKind::Left, "roles", "roles.id = users.role_id")
            .filter(Condition::eq("users.active", true))
            .filter(Condition::like("users.email", "%@example.com"))
            .group_by("roles.name")
            .order_by("users.id", Order::Desc)
            .limit(5)
            .offset(10)
            .build(Placeholder::Dollar)
            .unwrap();

        assert_eq!(
            stmt.sql,
            "SELECT DISTINCT users.id, roles.name, users.email AS contact FROM users \
             LEFT JOIN roles ON roles.id = users.role_id \
             WHERE users.active = $1 AND users.email LIKE $2 \
             GROUP BY roles.name ORDER BY users.id DESC LIMIT 5 OFFSET 10"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::Bool(true), SqlValue::Text("%@example.com".into())]
        );
    }

    #[test]
    fn join_condition_must_be_column_equality() {
        let err = Select::from("a")
            .join(JoinKind::Inner, "b", "a.id = 1; DROP TABLE b")
            .build(Placeholder::Dollar)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidJoin(_)));

        let err = Select::from("a")
            .join(JoinKind::Inner, "b", "a.id")
            .build(Placeholder::Dollar)
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidJoin(_)));
    }

    #[test]
    fn wildcard_column_is_allowed_in_projection() {
        let stmt = Select::from("t")
            .columns(["t.*"])
            .build(Placeholder::Question)
            .unwrap();
        assert_eq!(stmt.sql, "SELECT t.* FROM t");
    }
}
