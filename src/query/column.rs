//! Allow-list of queryable `payments` columns
//!
//! A [`Column`] is the only thing the compiler ever renders into SQL text.
//! Client-supplied field names are looked up here first; anything that is
//! not a known column never reaches a statement.

use super::QueryError;
use crate::core::field::FieldKind;
use serde::Serialize;
use std::fmt;

/// What a clause wants to do with a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Search,
    Filter,
    Range,
    Sort,
}

impl Operation {
    /// The request key that names the field for this operation
    pub fn key(self) -> &'static str {
        match self {
            Operation::Search => "search_field",
            Operation::Filter => "filter_field",
            Operation::Range => "range_field",
            Operation::Sort => "sort_field",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Search => "search",
            Operation::Filter => "filter",
            Operation::Range => "range",
            Operation::Sort => "sort",
        };
        f.write_str(name)
    }
}

/// A known column of the `payments` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Tag,
    Description,
    Amount,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl Column {
    /// Every column, in `SELECT` order
    pub const ALL: [Column; 7] = [
        Column::Id,
        Column::Tag,
        Column::Description,
        Column::Amount,
        Column::Status,
        Column::CreatedAt,
        Column::UpdatedAt,
    ];

    /// The column token rendered into SQL
    pub fn as_sql(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Tag => "tag",
            Column::Description => "description",
            Column::Amount => "amount",
            Column::Status => "status",
            Column::CreatedAt => "created_at",
            Column::UpdatedAt => "updated_at",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Column::Id => FieldKind::Uuid,
            Column::Tag | Column::Description | Column::Status => FieldKind::Text,
            Column::Amount => FieldKind::Decimal,
            Column::CreatedAt | Column::UpdatedAt => FieldKind::Timestamp,
        }
    }

    /// Whether the column can be used for `op`.
    ///
    /// ILIKE only applies to text columns; ordering ranges over UUIDs is
    /// meaningless.
    pub fn supports(self, op: Operation) -> bool {
        match op {
            Operation::Search => self.kind() == FieldKind::Text,
            Operation::Range => self != Column::Id,
            Operation::Filter | Operation::Sort => true,
        }
    }

    /// Exact, case-sensitive lookup of a column name
    pub fn lookup(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.as_sql() == name)
    }

    /// Resolve a client-supplied field name for `op`, or explain why not
    pub fn resolve(name: &str, op: Operation) -> Result<Column, QueryError> {
        let column = Column::lookup(name).ok_or_else(|| QueryError::UnknownField {
            key: op.key().to_string(),
            field: name.to_string(),
        })?;

        if !column.supports(op) {
            return Err(QueryError::UnsupportedOperation {
                key: op.key().to_string(),
                field: name.to_string(),
                operation: op,
            });
        }

        Ok(column)
    }

    /// Comma-separated select list of every column
    pub fn select_list() -> String {
        Column::ALL
            .iter()
            .map(|c| c.as_sql())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
