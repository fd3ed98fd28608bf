//! # Paystore
//!
//! A payment record store exposed over a REST API, with a safe dynamic
//! query compiler for list requests.
//!
//! ## Features
//!
//! - **Dynamic list queries**: search, filter, range, sort and pagination
//!   from flat query parameters
//! - **Allow-listed columns**: client field names never reach SQL text;
//!   every value is a bound parameter
//! - **Transactional create**: the store assigns id, status and timestamps
//!   inside one transaction, rolled back explicitly on any failure
//! - **Typed errors**: "not found" is distinct from backend failures
//! - **Backends**: PostgreSQL via sqlx, plus an in-memory store with fault
//!   injection for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paystore::prelude::*;
//!
//! let params = RawParams::from_pairs([
//!     ("search_field", "tag"),
//!     ("search_value", "ali"),
//!     ("filter_field", "status"),
//!     ("filter_value", "pending"),
//!     ("sort_field", "amount"),
//!     ("sort_direction", "desc"),
//!     ("page", "2"),
//!     ("per_page", "10"),
//! ]);
//! let spec = QuerySpec::from_params(&params)?;
//! let compiled = compile(&spec)?;
//! // SELECT ... WHERE 1=1 AND tag ILIKE $1 AND status = ANY($2)
//! //     ORDER BY amount DESC LIMIT $3 OFFSET $4
//! ```

pub mod config;
pub mod core;
pub mod query;
pub mod server;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::{AppConfig, DatabaseConfig, LogFormat};
    pub use crate::core::{
        DEFAULT_STATUS, FieldKind, FieldValue, NewPayment, Payment, PaymentError, PaymentRepository,
        PaymentResult, PaymentService, TransactionStage,
    };
    pub use crate::query::{
        Column, CompiledQuery, Pagination, QueryError, QuerySpec, RawParams, SortDirection, SqlArg,
        compile,
    };
    pub use crate::server::{ServerBuilder, build_payment_routes};
    pub use crate::storage::{Fault, InMemoryPaymentRepository};

    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresPaymentRepository;
}
