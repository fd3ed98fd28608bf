//! HTTP exposure of the payment store
//!
//! This module provides a `ServerBuilder` that wires a repository into a
//! `PaymentService` and registers:
//! - the `/api/v1/payments` routes behind bearer-token auth
//! - the `/healthz` liveness route
//! - request tracing for every route

pub mod auth;
pub mod builder;
pub mod handlers;
pub mod response;
pub mod router;

pub use auth::BearerAuth;
pub use builder::ServerBuilder;
pub use handlers::{CreatePaymentRequest, UpdateStatusRequest};
pub use response::{ApiFailure, ApiResponse};
pub use router::build_payment_routes;
