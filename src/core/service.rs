//! Payment use cases on top of a [`PaymentRepository`]
//!
//! The service owns the transaction lifecycle for writes that need one and
//! applies the optional per-operation deadline. Everything else delegates
//! to the repository.

use crate::core::error::{PaymentError, PaymentResult};
use crate::core::payment::{NewPayment, Payment};
use crate::core::store::PaymentRepository;
use crate::query::QuerySpec;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Payment operations over repository `R`
pub struct PaymentService<R> {
    repository: Arc<R>,
    operation_timeout: Option<Duration>,
}

impl<R> Clone for PaymentService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            operation_timeout: self.operation_timeout,
        }
    }
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            operation_timeout: None,
        }
    }

    /// Bound every operation to `timeout`; `None` disables the deadline
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    /// List payments matching `spec`
    pub async fn get_all(&self, spec: &QuerySpec) -> PaymentResult<Vec<Payment>> {
        let payments = self
            .deadline("list", self.repository.fetch_with_query(spec))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to list payments"))?;

        tracing::debug!(count = payments.len(), "listed payments");
        Ok(payments)
    }

    pub async fn get_by_id(&self, id: Uuid) -> PaymentResult<Payment> {
        self.deadline("get", self.repository.fetch_by_id(id))
            .await
            .inspect_err(|e| log_failure("get", id, e))
    }

    pub async fn update_status_by_id(&self, id: Uuid, status: &str) -> PaymentResult<Payment> {
        let payment = self
            .deadline("update_status", self.repository.modify_status_by_id(id, status))
            .await
            .inspect_err(|e| log_failure("update_status", id, e))?;

        tracing::info!(payment_id = %id, status = %payment.status, "payment status updated");
        Ok(payment)
    }

    /// Insert a payment in its own transaction.
    ///
    /// The store assigns id, status and timestamps; the returned payment is
    /// the committed row. Any failure after `begin` rolls the transaction
    /// back before the error is returned.
    ///
    /// The commit is not covered by the operation deadline; callers that
    /// need a hard bound must wrap this call in their own timeout.
    pub async fn create(&self, payment: NewPayment) -> PaymentResult<Payment> {
        let created = self
            .in_transaction("create", move |repo, tx| repo.store(tx, payment))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to create payment"))?;

        tracing::info!(payment_id = %created.id, tag = %created.tag, "payment created");
        Ok(created)
    }

    /// Delete a payment; deleting a missing id is not an error
    pub async fn delete(&self, id: Uuid) -> PaymentResult<()> {
        self.deadline("delete", self.repository.remove(id))
            .await
            .inspect_err(|e| log_failure("delete", id, e))?;

        tracing::info!(payment_id = %id, "payment deleted");
        Ok(())
    }

    /// Run `work` inside a transaction.
    ///
    /// `Ok` commits. `Err`, or the deadline expiring, rolls back and returns
    /// the original error; a rollback failure is logged, not returned. The
    /// commit itself is not subject to the deadline.
    async fn in_transaction<T, F>(&self, operation: &'static str, work: F) -> PaymentResult<T>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t R, &'t mut R::Tx) -> BoxFuture<'t, PaymentResult<T>> + Send,
    {
        let repo = self.repository.as_ref();
        let mut tx = self.deadline(operation, repo.begin()).await?;

        match self.deadline(operation, work(repo, &mut tx)).await {
            Ok(value) => {
                repo.commit(tx).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = repo.rollback(tx).await {
                    tracing::error!(
                        operation,
                        error = %rollback_err,
                        "rollback failed after {}",
                        err
                    );
                } else {
                    tracing::warn!(operation, error = %err, "transaction rolled back");
                }
                Err(err)
            }
        }
    }

    /// Apply the configured deadline to `fut`; expiry drops the future
    async fn deadline<T, Fut>(&self, operation: &'static str, fut: Fut) -> PaymentResult<T>
    where
        Fut: Future<Output = PaymentResult<T>>,
    {
        let Some(limit) = self.operation_timeout else {
            return fut.await;
        };

        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "operation deadline exceeded");
                Err(PaymentError::Timeout { operation })
            }
        }
    }
}

fn log_failure(operation: &'static str, id: Uuid, err: &PaymentError) {
    if err.is_not_found() {
        tracing::debug!(operation, payment_id = %id, "payment not found");
    } else {
        tracing::error!(operation, payment_id = %id, error = %err, "payment operation failed");
    }
}
