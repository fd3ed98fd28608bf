//! JSON response envelope shared by every payment route
//!
//! ```json
//! { "status": "success", "entity": "payments", "state": "getPaymentByID",
//!   "message": "Success Get Payment by ID", "data": { ... } }
//! ```
//!
//! Failures use the same envelope with `"status": "failed"`, no `data`, and
//! an `error` object carrying the machine-readable code.

use crate::core::error::PaymentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Entity name reported in every envelope
pub const ENTITY: &str = "payments";

/// Machine-readable part of a failed response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub entity: &'static str,
    pub state: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(state: &'static str, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: "success",
            entity: ENTITY,
            state,
            message: message.into(),
            data,
            meta: None,
            error: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl ApiResponse<()> {
    pub fn failed(state: &'static str, error: &PaymentError) -> Self {
        Self {
            status: "failed",
            entity: ENTITY,
            state,
            message: error.to_string(),
            data: None,
            meta: None,
            error: Some(ErrorBody {
                code: error.error_code(),
                details: error.details(),
            }),
        }
    }
}

/// A [`PaymentError`] raised while serving the operation named by `state`
#[derive(Debug)]
pub struct ApiFailure {
    pub state: &'static str,
    pub error: PaymentError,
}

impl ApiFailure {
    pub fn new(state: &'static str, error: impl Into<PaymentError>) -> Self {
        Self {
            state,
            error: error.into(),
        }
    }

    /// `map_err` adapter: `.map_err(ApiFailure::at("createPayment"))`
    pub fn at<E: Into<PaymentError>>(state: &'static str) -> impl FnOnce(E) -> ApiFailure {
        move |error| ApiFailure::new(state, error)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR || status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(state = self.state, code = self.error.error_code(), error = %self.error, "request failed");
        } else {
            tracing::debug!(state = self.state, code = self.error.error_code(), error = %self.error, "request rejected");
        }

        (status, Json(ApiResponse::failed(self.state, &self.error))).into_response()
    }
}
