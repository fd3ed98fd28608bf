//! In-memory implementation of PaymentRepository for testing and development
//!
//! List queries are compiled first, so the in-memory store rejects exactly
//! what PostgreSQL would, then evaluated in process with the same
//! semantics: case-insensitive contains for search, `= ANY` for filters,
//! inclusive bounds for ranges, NULL timestamps never match a filter or
//! range, and NULLs sort last ascending / first descending. Text ordering
//! is byte order rather than a database collation.
//!
//! Transactions stage inserts and apply them on commit. Faults and an
//! artificial delay can be injected to exercise failure paths.

use crate::core::error::{PaymentError, PaymentResult, TransactionStage};
use crate::core::field::FieldValue;
use crate::core::payment::{DEFAULT_STATUS, NewPayment, Payment};
use crate::core::store::PaymentRepository;
use crate::query::{Column, Operation, QueryError, QuerySpec, SortDirection, compile};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// A repository step that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Begin,
    Insert,
    Commit,
    Rollback,
}

/// Open in-memory transaction: inserts not yet visible to readers
#[derive(Debug, Default)]
pub struct InMemoryTx {
    staged: Vec<Payment>,
}

impl InMemoryTx {
    pub fn staged(&self) -> &[Payment] {
        &self.staged
    }
}

/// In-memory payment repository
///
/// Clones share the same rows, faults and counters.
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<Vec<Payment>>>,
    faults: Arc<RwLock<HashSet<Fault>>>,
    delay: Option<Duration>,
    inserts: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with already committed rows
    pub fn with_payments(self, payments: Vec<Payment>) -> Self {
        if let Ok(mut rows) = self.payments.write() {
            rows.extend(payments);
        }
        self
    }

    pub fn with_fault(self, fault: Fault) -> Self {
        self.set_fault(fault, true);
        self
    }

    /// Sleep this long before every data operation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_fault(&self, fault: Fault, enabled: bool) {
        if let Ok(mut faults) = self.faults.write() {
            if enabled {
                faults.insert(fault);
            } else {
                faults.remove(&fault);
            }
        }
    }

    /// Committed rows
    pub fn len(&self) -> usize {
        self.payments.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `store` calls, successful or not
    pub fn inserts(&self) -> usize {
        self.inserts.load(AtomicOrdering::SeqCst)
    }

    /// Successful commits
    pub fn commits(&self) -> usize {
        self.commits.load(AtomicOrdering::SeqCst)
    }

    /// Rollbacks requested, successful or not
    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(AtomicOrdering::SeqCst)
    }

    fn fails(&self, fault: Fault) -> bool {
        self.faults
            .read()
            .map(|faults| faults.contains(&fault))
            .unwrap_or(false)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn read_rows(
        &self,
        operation: &'static str,
        id: Option<Uuid>,
    ) -> PaymentResult<std::sync::RwLockReadGuard<'_, Vec<Payment>>> {
        self.payments
            .read()
            .map_err(|e| PaymentError::store(operation, id, format!("failed to acquire read lock: {}", e)))
    }

    fn write_rows(
        &self,
        operation: &'static str,
        id: Option<Uuid>,
    ) -> PaymentResult<std::sync::RwLockWriteGuard<'_, Vec<Payment>>> {
        self.payments
            .write()
            .map_err(|e| PaymentError::store(operation, id, format!("failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    type Tx = InMemoryTx;

    async fn begin(&self) -> PaymentResult<InMemoryTx> {
        if self.fails(Fault::Begin) {
            return Err(PaymentError::transaction(TransactionStage::Begin, "injected fault"));
        }
        Ok(InMemoryTx::default())
    }

    async fn commit(&self, tx: InMemoryTx) -> PaymentResult<()> {
        if self.fails(Fault::Commit) {
            return Err(PaymentError::transaction(TransactionStage::Commit, "injected fault"));
        }

        let mut rows = self
            .payments
            .write()
            .map_err(|e| PaymentError::transaction(TransactionStage::Commit, e))?;
        rows.extend(tx.staged);
        self.commits.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn rollback(&self, tx: InMemoryTx) -> PaymentResult<()> {
        self.rollbacks.fetch_add(1, AtomicOrdering::SeqCst);
        tracing::debug!(discarded = tx.staged.len(), "in-memory transaction rolled back");

        if self.fails(Fault::Rollback) {
            return Err(PaymentError::transaction(TransactionStage::Rollback, "injected fault"));
        }
        Ok(())
    }

    async fn fetch_with_query(&self, spec: &QuerySpec) -> PaymentResult<Vec<Payment>> {
        compile(spec)?;
        self.pause().await;

        let rows = self.read_rows("list", None)?;
        let mut matched = Vec::new();
        for payment in rows.iter() {
            if matches(payment, spec)? {
                matched.push(payment.clone());
            }
        }
        drop(rows);

        if let Some(sort) = spec.sort() {
            let column = Column::resolve(&sort.field, Operation::Sort)?;
            matched.sort_by(|a, b| {
                let ord = nulls_last(a.field(column), b.field(column));
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some(page) = spec.pagination() {
            let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
            matched = matched.into_iter().skip(offset).take(limit).collect();
        }

        Ok(matched)
    }

    async fn fetch_by_id(&self, id: Uuid) -> PaymentResult<Payment> {
        self.pause().await;

        self.read_rows("get", Some(id))?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(PaymentError::NotFound { id })
    }

    async fn modify_status_by_id(&self, id: Uuid, status: &str) -> PaymentResult<Payment> {
        self.pause().await;

        let mut rows = self.write_rows("update_status", Some(id))?;
        let payment = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PaymentError::NotFound { id })?;

        payment.status = status.to_string();
        payment.updated_at = Some(Utc::now());
        Ok(payment.clone())
    }

    async fn store(&self, tx: &mut InMemoryTx, payment: NewPayment) -> PaymentResult<Payment> {
        self.inserts.fetch_add(1, AtomicOrdering::SeqCst);
        self.pause().await;

        if self.fails(Fault::Insert) {
            return Err(PaymentError::store("insert", None, "injected fault"));
        }

        let now = Utc::now();
        let stored = Payment {
            id: Uuid::new_v4(),
            tag: payment.tag,
            description: payment.description,
            amount: payment.amount,
            status: DEFAULT_STATUS.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        tx.staged.push(stored.clone());
        Ok(stored)
    }

    async fn remove(&self, id: Uuid) -> PaymentResult<()> {
        self.pause().await;

        self.write_rows("delete", Some(id))?.retain(|p| p.id != id);
        Ok(())
    }
}

fn matches(payment: &Payment, spec: &QuerySpec) -> Result<bool, QueryError> {
    if let Some(search) = spec.search() {
        let column = Column::resolve(&search.field, Operation::Search)?;
        let needle = search.value.to_lowercase();
        let found = payment
            .field(column)
            .as_ref()
            .and_then(FieldValue::as_text)
            .is_some_and(|text| text.to_lowercase().contains(&needle));
        if !found {
            return Ok(false);
        }
    }

    for filter in spec.filters() {
        let column = Column::resolve(&filter.field, Operation::Filter)?;
        if filter.values.is_empty() {
            continue;
        }
        let Some(value) = payment.field(column) else {
            return Ok(false);
        };
        if !filter
            .values
            .iter()
            .any(|v| value.compare(v) == Some(Ordering::Equal))
        {
            return Ok(false);
        }
    }

    for range in spec.ranges() {
        let column = Column::resolve(&range.field, Operation::Range)?;
        let Some(value) = payment.field(column) else {
            return Ok(false);
        };
        if let Some(from) = &range.from {
            if !matches!(value.compare(from), Some(Ordering::Greater | Ordering::Equal)) {
                return Ok(false);
            }
        }
        if let Some(to) = &range.to {
            if !matches!(value.compare(to), Some(Ordering::Less | Ordering::Equal)) {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

/// Ascending order with NULLs after every value
fn nulls_last(a: Option<FieldValue>, b: Option<FieldValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}
