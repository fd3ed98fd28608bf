//! Shared test harness for payment repository backends
//!
//! Provides helpers for building payments and query parameters, plus two
//! macro-generated suites that any `PaymentRepository` must pass:
//!
//! - `payment_repository_tests!`: repository contract through `PaymentService`
//! - `rest_integration_tests!`: the same backend behind the HTTP routes
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! payment_repository_tests!(InMemoryPaymentRepository::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod payment_repository_tests;

#[macro_use]
pub mod rest_tests;

use bigdecimal::BigDecimal;
use paystore::core::{NewPayment, Payment, PaymentRepository, PaymentService};
use paystore::query::RawParams;
use std::str::FromStr;

/// Parse a decimal literal
pub fn decimal(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).expect("valid decimal literal")
}

pub fn new_payment(tag: &str, amount: &str) -> NewPayment {
    NewPayment::new(tag, format!("{} payment", tag), decimal(amount))
}

/// Raw list parameters, repeated keys kept in order
pub fn params(pairs: &[(&str, &str)]) -> RawParams {
    pairs.iter().copied().collect()
}

/// Create one payment per `(tag, amount)` through the service
pub async fn seed<R: PaymentRepository>(
    service: &PaymentService<R>,
    rows: &[(&str, &str)],
) -> Vec<Payment> {
    let mut created = Vec::with_capacity(rows.len());
    for (tag, amount) in rows {
        created.push(
            service
                .create(new_payment(tag, amount))
                .await
                .expect("seed payment"),
        );
    }
    created
}

/// Tags of `payments`, in order
pub fn tags(payments: &[Payment]) -> Vec<String> {
    payments.iter().map(|p| p.tag.clone()).collect()
}
