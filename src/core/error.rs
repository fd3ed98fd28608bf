//! Typed error handling for the payment store
//!
//! Callers get a small, matchable taxonomy instead of a generic
//! `anyhow::Error`, so "absent" and "broken" can be handled differently.
//!
//! # Error Categories
//!
//! - [`PaymentError::InvalidQuery`]: malformed list query, rejected before the store
//! - [`PaymentError::NotFound`]: valid request, no matching row
//! - [`PaymentError::Store`]: backend execution failure
//! - [`PaymentError::Transaction`]: begin/commit/rollback failure
//! - [`PaymentError::Timeout`]: the operation deadline expired
//! - [`ValidationError`] / [`RequestError`]: HTTP input errors
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get_by_id(id).await {
//!     Ok(payment) => println!("Found: {:?}", payment),
//!     Err(PaymentError::NotFound { id }) => println!("Payment {} not found", id),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use crate::query::QueryError;
use axum::http::StatusCode;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for payment operations
#[derive(Debug)]
pub enum PaymentError {
    /// The list query could not be turned into a specification
    InvalidQuery(QueryError),

    /// No payment with this id
    NotFound { id: Uuid },

    /// Backend execution failure (connection, constraint, driver)
    Store {
        operation: &'static str,
        id: Option<Uuid>,
        message: String,
    },

    /// Transaction lifecycle failure
    Transaction {
        stage: TransactionStage,
        message: String,
    },

    /// The configured operation deadline expired
    Timeout { operation: &'static str },

    /// Input validation errors
    Validation(ValidationError),

    /// HTTP/Request errors
    Request(RequestError),
}

/// Which step of the transaction lifecycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStage {
    Begin,
    Commit,
    Rollback,
}

impl fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStage::Begin => f.write_str("begin"),
            TransactionStage::Commit => f.write_str("commit"),
            TransactionStage::Rollback => f.write_str("rollback"),
        }
    }
}

impl PaymentError {
    /// Wrap a backend error with the operation (and identity) it came from
    pub fn store(operation: &'static str, id: Option<Uuid>, err: impl fmt::Display) -> Self {
        PaymentError::Store {
            operation,
            id,
            message: err.to_string(),
        }
    }

    pub fn transaction(stage: TransactionStage, err: impl fmt::Display) -> Self {
        PaymentError::Transaction {
            stage,
            message: err.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound { .. } => StatusCode::NOT_FOUND,
            PaymentError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PaymentError::Transaction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PaymentError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PaymentError::Request(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::InvalidQuery(_) => "INVALID_QUERY",
            PaymentError::NotFound { .. } => "PAYMENT_NOT_FOUND",
            PaymentError::Store { .. } => "STORE_ERROR",
            PaymentError::Transaction { .. } => "TRANSACTION_ERROR",
            PaymentError::Timeout { .. } => "TIMEOUT",
            PaymentError::Validation(_) => "VALIDATION_ERROR",
            PaymentError::Request(e) => e.error_code(),
        }
    }

    /// Additional machine-readable details, if any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            PaymentError::InvalidQuery(e) => Some(serde_json::json!({ "key": e.key() })),
            PaymentError::NotFound { id } => Some(serde_json::json!({ "id": id.to_string() })),
            PaymentError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }

    /// True when the error means "absent" rather than "broken"
    pub fn is_not_found(&self) -> bool {
        matches!(self, PaymentError::NotFound { .. })
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::InvalidQuery(e) => write!(f, "Invalid query: {}", e),
            PaymentError::NotFound { id } => write!(f, "payment with id '{}' not found", id),
            PaymentError::Store {
                operation,
                id: Some(id),
                message,
            } => write!(f, "Failed to {} payment '{}': {}", operation, id, message),
            PaymentError::Store {
                operation,
                id: None,
                message,
            } => write!(f, "Failed to {} payments: {}", operation, message),
            PaymentError::Transaction { stage, message } => {
                write!(f, "Transaction {} failed: {}", stage, message)
            }
            PaymentError::Timeout { operation } => {
                write!(f, "Operation '{}' exceeded its deadline", operation)
            }
            PaymentError::Validation(e) => write!(f, "{}", e),
            PaymentError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PaymentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaymentError::InvalidQuery(e) => Some(e),
            PaymentError::Validation(e) => Some(e),
            PaymentError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<QueryError> for PaymentError {
    fn from(err: QueryError) -> Self {
        PaymentError::InvalidQuery(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid UUID format
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidUuid { value } => {
                write!(f, "Invalid UUID format: {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for PaymentError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PaymentError::Validation(errors.into())
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Invalid request body
    InvalidBody { message: String },

    /// Unauthorized request
    Unauthorized { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::Unauthorized { message } => {
                write!(f, "Unauthorized: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
        }
    }
}

impl From<RequestError> for PaymentError {
    fn from(err: RequestError) -> Self {
        PaymentError::Request(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

// =============================================================================
// Tests
// =============================================================================
