//! HTTP handlers for payment operations
//!
//! Handlers are generic over the repository so the same routes serve
//! PostgreSQL in production and the in-memory store in tests.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use super::response::{ApiFailure, ApiResponse};
use crate::core::error::{RequestError, ValidationError};
use crate::core::{NewPayment, Payment, PaymentRepository, PaymentService};
use crate::query::{QuerySpec, RawParams};

const GET_ALL: &str = "getAllPayments";
const GET_BY_ID: &str = "getPaymentByID";
const CREATE: &str = "createPayment";
const UPDATE_STATUS: &str = "updatePaymentByID";
const DELETE: &str = "deletePaymentByID";

/// Request body for creating a payment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1, max = 255, message = "tag must be 1 to 255 characters"))]
    pub tag: String,

    #[serde(default)]
    #[validate(length(max = 1024, message = "description must be at most 1024 characters"))]
    pub description: String,

    /// A JSON string or number; numbers keep their literal digits
    #[validate(custom(function = "validate_amount"))]
    pub amount: BigDecimal,
}

impl From<CreatePaymentRequest> for NewPayment {
    fn from(request: CreatePaymentRequest) -> Self {
        NewPayment::new(request.tag, request.description, request.amount)
    }
}

fn validate_amount(amount: &BigDecimal) -> Result<(), validator::ValidationError> {
    if *amount <= BigDecimal::from(0) {
        let mut err = validator::ValidationError::new("positive");
        err.message = Some("amount must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

/// Request body for updating a payment's status
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "status is required"))]
    pub status: String,
}

fn parse_id(state: &'static str, raw: &str) -> Result<Uuid, ApiFailure> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiFailure::new(
            state,
            ValidationError::InvalidUuid {
                value: raw.to_string(),
            },
        )
    })
}

fn body<T>(state: &'static str, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        ApiFailure::new(
            state,
            RequestError::InvalidBody {
                message: rejection.body_text(),
            },
        )
    })
}

/// GET /healthz
pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "paystore"
    }))
}

/// GET /api/v1/payments
///
/// The echoed specification and the row count come back as `meta`.
pub async fn list_payments<R: PaymentRepository>(
    State(service): State<PaymentService<R>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiFailure> {
    let spec = QuerySpec::from_params(&RawParams::from_pairs(pairs)).map_err(ApiFailure::at(GET_ALL))?;
    let payments = service.get_all(&spec).await.map_err(ApiFailure::at(GET_ALL))?;

    let meta = json!({ "query": spec, "count": payments.len() });
    Ok(Json(
        ApiResponse::success(GET_ALL, "Success Get All Payments", Some(payments)).with_meta(meta),
    ))
}

/// GET /api/v1/payments/{id}
pub async fn get_payment<R: PaymentRepository>(
    State(service): State<PaymentService<R>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Payment>>, ApiFailure> {
    let id = parse_id(GET_BY_ID, &id)?;
    let payment = service.get_by_id(id).await.map_err(ApiFailure::at(GET_BY_ID))?;

    Ok(Json(ApiResponse::success(
        GET_BY_ID,
        "Success Get Payment by ID",
        Some(payment),
    )))
}

/// POST /api/v1/payments
pub async fn create_payment<R: PaymentRepository>(
    State(service): State<PaymentService<R>>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiFailure> {
    let request = body(CREATE, payload)?;
    request.validate().map_err(ApiFailure::at(CREATE))?;

    let payment = service
        .create(request.into())
        .await
        .map_err(ApiFailure::at(CREATE))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CREATE, "Success Create Payment", Some(payment))),
    ))
}

/// PUT /api/v1/payments/status/{id}
pub async fn update_payment_status<R: PaymentRepository>(
    State(service): State<PaymentService<R>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Payment>>, ApiFailure> {
    let id = parse_id(UPDATE_STATUS, &id)?;
    let request = body(UPDATE_STATUS, payload)?;
    request.validate().map_err(ApiFailure::at(UPDATE_STATUS))?;

    let payment = service
        .update_status_by_id(id, &request.status)
        .await
        .map_err(ApiFailure::at(UPDATE_STATUS))?;

    Ok(Json(ApiResponse::success(
        UPDATE_STATUS,
        "Payment Updated",
        Some(payment),
    )))
}

/// DELETE /api/v1/payments/{id}
pub async fn delete_payment<R: PaymentRepository>(
    State(service): State<PaymentService<R>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiFailure> {
    let id = parse_id(DELETE, &id)?;
    service.delete(id).await.map_err(ApiFailure::at(DELETE))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(DELETE, "Success Delete Payment", None)),
    ))
}
