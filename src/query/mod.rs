//! Dynamic list queries: specification, builder and SQL compiler
//!
//! ```text
//! raw params ──► QuerySpec::from_params ──► QuerySpec ──► compile ──► CompiledQuery { sql, args }
//!                 (allow-list, typed values)              (pure, positional $n binding)
//! ```

pub mod builder;
pub mod column;
pub mod compiler;
pub mod spec;

pub use builder::RawParams;
pub use column::{Column, Operation};
pub use compiler::{CompiledQuery, SqlArg, compile};
pub use spec::{FilterClause, Pagination, QuerySpec, RangeClause, SearchClause, SortClause, SortDirection};

/// A list query that cannot be turned into a safe statement.
///
/// Every variant names the request key at fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown field '{field}' in '{key}'")]
    UnknownField { key: String, field: String },

    #[error("field '{field}' in '{key}' does not support {operation}")]
    UnsupportedOperation {
        key: String,
        field: String,
        operation: Operation,
    },

    #[error("invalid value '{value}' in '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("'{key}' has {found} entries but '{paired_with}' has {expected}")]
    MismatchedPairs {
        key: String,
        paired_with: String,
        expected: usize,
        found: usize,
    },
}

impl QueryError {
    /// The request key that caused the error
    pub fn key(&self) -> &str {
        match self {
            QueryError::UnknownField { key, .. }
            | QueryError::UnsupportedOperation { key, .. }
            | QueryError::InvalidValue { key, .. }
            | QueryError::MismatchedPairs { key, .. } => key,
        }
    }
}
