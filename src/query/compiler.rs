//! Compiles a [`QuerySpec`] into one parameterized PostgreSQL statement
//!
//! The compiler is a pure function: no I/O, and the same specification
//! always yields the same text and arguments. Column names come only from
//! the [`Column`] allow-list; every value is a bound `$n` parameter whose
//! position is taken from the argument list itself, so text and arguments
//! cannot drift apart.
//!
//! A specification with no clauses compiles to `... WHERE 1=1` with no
//! `ORDER BY` and no `LIMIT`: it fetches every row. That is intentional
//! and left to the caller to bound.

use super::column::{Column, Operation};
use super::spec::QuerySpec;
use super::QueryError;
use crate::core::field::{FieldKind, FieldValue};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use uuid::Uuid;

/// A bound statement argument, typed for the PostgreSQL driver
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    TextArray(Vec<String>),
    Decimal(BigDecimal),
    DecimalArray(Vec<BigDecimal>),
    Timestamp(DateTime<Utc>),
    TimestampArray(Vec<DateTime<Utc>>),
    Uuid(Uuid),
    UuidArray(Vec<Uuid>),
    BigInt(i64),
}

impl From<FieldValue> for SqlArg {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => SqlArg::Text(s),
            FieldValue::Decimal(d) => SqlArg::Decimal(d),
            FieldValue::Timestamp(ts) => SqlArg::Timestamp(ts),
            FieldValue::Uuid(id) => SqlArg::Uuid(id),
        }
    }
}

/// Statement text plus its arguments in `$1..$n` order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

/// Base select; `WHERE 1=1` lets every clause start with ` AND`
pub fn base_select() -> String {
    format!("SELECT {} FROM payments WHERE 1=1", Column::select_list())
}

/// Compile `spec` into SQL text and ordered arguments.
///
/// Fails with [`QueryError`] (and produces no SQL) when any clause names a
/// field outside the allow-list, uses a column for an unsupported
/// operation, or carries values of the wrong kind for its column. A filter
/// with no values adds no condition.
pub fn compile(spec: &QuerySpec) -> Result<CompiledQuery, QueryError> {
    let mut stmt = Statement::new(base_select());

    if let Some(search) = spec.search() {
        let column = Column::resolve(&search.field, Operation::Search)?;
        let n = stmt.bind(SqlArg::Text(contains_pattern(&search.value)));
        stmt.push(format_args!(" AND {} ILIKE ${}", column, n));
    }

    for filter in spec.filters() {
        let column = Column::resolve(&filter.field, Operation::Filter)?;
        if filter.values.is_empty() {
            continue;
        }
        let n = stmt.bind(array_arg(column, &filter.values)?);
        stmt.push(format_args!(" AND {} = ANY(${})", column, n));
    }

    for range in spec.ranges() {
        let column = Column::resolve(&range.field, Operation::Range)?;
        if let Some(from) = &range.from {
            let n = stmt.bind(scalar_arg(column, "from", from)?);
            stmt.push(format_args!(" AND {} >= ${}", column, n));
        }
        if let Some(to) = &range.to {
            let n = stmt.bind(scalar_arg(column, "to", to)?);
            stmt.push(format_args!(" AND {} <= ${}", column, n));
        }
    }

    if let Some(sort) = spec.sort() {
        let column = Column::resolve(&sort.field, Operation::Sort)?;
        stmt.push(format_args!(" ORDER BY {} {}", column, sort.direction.as_sql()));
    }

    if let Some(page) = spec.pagination() {
        let limit = stmt.bind(SqlArg::BigInt(page.limit()));
        let offset = stmt.bind(SqlArg::BigInt(page.offset()));
        stmt.push(format_args!(" LIMIT ${} OFFSET ${}", limit, offset));
    }

    Ok(stmt.finish())
}

/// `%value%` with LIKE wildcards in `value` escaped, so the search is a
/// literal "contains"
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn kind_mismatch(column: Column, key: &str, value: &FieldValue) -> QueryError {
    QueryError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: format!("column '{}' expects {} values, got {}", column, column.kind(), value.kind()),
    }
}

fn scalar_arg(column: Column, key: &str, value: &FieldValue) -> Result<SqlArg, QueryError> {
    if value.kind() != column.kind() {
        return Err(kind_mismatch(column, key, value));
    }
    Ok(SqlArg::from(value.clone()))
}

/// All filter values as one typed array argument
fn array_arg(column: Column, values: &[FieldValue]) -> Result<SqlArg, QueryError> {
    let mismatch = |v: &FieldValue| kind_mismatch(column, "filter_value", v);

    let arg = match column.kind() {
        FieldKind::Text => SqlArg::TextArray(
            values
                .iter()
                .map(|v| match v {
                    FieldValue::Text(s) => Ok(s.clone()),
                    other => Err(mismatch(other)),
                })
                .collect::<Result<_, _>>()?,
        ),
        FieldKind::Decimal => SqlArg::DecimalArray(
            values
                .iter()
                .map(|v| match v {
                    FieldValue::Decimal(d) => Ok(d.clone()),
                    other => Err(mismatch(other)),
                })
                .collect::<Result<_, _>>()?,
        ),
        FieldKind::Timestamp => SqlArg::TimestampArray(
            values
                .iter()
                .map(|v| match v {
                    FieldValue::Timestamp(ts) => Ok(*ts),
                    other => Err(mismatch(other)),
                })
                .collect::<Result<_, _>>()?,
        ),
        FieldKind::Uuid => SqlArg::UuidArray(
            values
                .iter()
                .map(|v| match v {
                    FieldValue::Uuid(id) => Ok(*id),
                    other => Err(mismatch(other)),
                })
                .collect::<Result<_, _>>()?,
        ),
    };

    Ok(arg)
}

/// Statement under construction
struct Statement {
    sql: String,
    args: Vec<SqlArg>,
}

impl Statement {
    fn new(base: String) -> Self {
        Self {
            sql: base,
            args: Vec::new(),
        }
    }

    /// Append an argument and return its 1-based placeholder position
    fn bind(&mut self, arg: SqlArg) -> usize {
        self.args.push(arg);
        self.args.len()
    }

    fn push(&mut self, fragment: std::fmt::Arguments<'_>) {
        // Writing into a String cannot fail
        let _ = self.sql.write_fmt(fragment);
    }

    fn finish(self) -> CompiledQuery {
        CompiledQuery {
            sql: self.sql,
            args: self.args,
        }
    }
}
