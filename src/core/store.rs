//! Repository trait for payment persistence
//!
//! A repository executes already-validated work against one backend. It
//! never builds SQL from client input itself: list queries arrive as a
//! [`QuerySpec`] and go through [`compile`](crate::query::compile).

use crate::core::error::PaymentResult;
use crate::core::payment::{NewPayment, Payment};
use crate::query::QuerySpec;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage backend for payments.
///
/// Reads and single-statement writes run on the backend's own connection
/// handling. [`store`](Self::store) runs inside a transaction opened with
/// [`begin`](Self::begin); the caller owns that handle and must finish it
/// with exactly one of [`commit`](Self::commit) or
/// [`rollback`](Self::rollback).
///
/// Every failure is a [`PaymentError`](crate::core::error::PaymentError):
/// a missing row is `NotFound`, backend trouble is `Store` or
/// `Transaction`.
#[async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// An open transaction
    type Tx: Send;

    async fn begin(&self) -> PaymentResult<Self::Tx>;

    async fn commit(&self, tx: Self::Tx) -> PaymentResult<()>;

    async fn rollback(&self, tx: Self::Tx) -> PaymentResult<()>;

    /// Payments matching `spec`, in the order it asks for
    async fn fetch_with_query(&self, spec: &QuerySpec) -> PaymentResult<Vec<Payment>>;

    async fn fetch_by_id(&self, id: Uuid) -> PaymentResult<Payment>;

    /// Set the status of one payment and return the updated row
    async fn modify_status_by_id(&self, id: Uuid, status: &str) -> PaymentResult<Payment>;

    /// Insert within `tx`; the backend assigns id, status and timestamps
    async fn store(&self, tx: &mut Self::Tx, payment: NewPayment) -> PaymentResult<Payment>;

    /// Delete one payment. Deleting an id that does not exist succeeds.
    async fn remove(&self, id: Uuid) -> PaymentResult<()>;
}
