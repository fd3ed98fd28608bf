//! Router assembly for the payment API

use axum::{
    Router, middleware,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use super::auth::{BearerAuth, require_bearer};
use super::handlers::{
    create_payment, delete_payment, get_payment, healthz, list_payments, update_payment_status,
};
use crate::core::{PaymentRepository, PaymentService};

/// Build the payment routes
///
/// - GET /healthz - Liveness, never authenticated
/// - GET /api/v1/payments - List with search/filter/range/sort/pagination
/// - POST /api/v1/payments - Create
/// - GET /api/v1/payments/{id} - Fetch one
/// - DELETE /api/v1/payments/{id} - Delete
/// - PUT /api/v1/payments/status/{id} - Update status
pub fn build_payment_routes<R: PaymentRepository>(
    service: PaymentService<R>,
    auth: BearerAuth,
) -> Router {
    let api = Router::new()
        .route(
            "/api/v1/payments",
            get(list_payments::<R>).post(create_payment::<R>),
        )
        .route(
            "/api/v1/payments/{id}",
            get(get_payment::<R>).delete(delete_payment::<R>),
        )
        .route(
            "/api/v1/payments/status/{id}",
            put(update_payment_status::<R>),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_bearer))
        .with_state(service);

    Router::new()
        .route("/healthz", get(healthz))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}
