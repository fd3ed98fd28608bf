//! Core types of the payment store: records, errors, repository and service

pub mod error;
pub mod field;
pub mod payment;
pub mod service;
pub mod store;

pub use error::{PaymentError, PaymentResult, TransactionStage};
pub use field::{FieldKind, FieldValue};
pub use payment::{DEFAULT_STATUS, NewPayment, Payment};
pub use service::PaymentService;
pub use store::PaymentRepository;
