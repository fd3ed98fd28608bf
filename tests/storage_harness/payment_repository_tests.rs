//! Macro-generated contract suite for `PaymentRepository` backends.
//!
//! Every test goes through `PaymentService`, the way the HTTP layer uses a
//! repository.
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_create_assigns_server_fields`: id, `pending` status, timestamps
//! - `test_get_nonexistent_is_not_found`: `NotFound`, never `Store`
//! - `test_list_empty`
//! - `test_update_status`: returns the updated row, bumps `updated_at`
//! - `test_update_status_nonexistent`: `NotFound`
//! - `test_delete_is_idempotent`
//! - `test_amount_precision_round_trip`
//!
//! ## Query
//! - `test_search_case_insensitive`
//! - `test_search_wildcards_are_literal`
//! - `test_filter_merged_values`
//! - `test_range_bounds_inclusive`
//! - `test_sort_and_paginate`
//! - `test_unknown_field_rejected`
//!
//! ## Concurrency
//! - `test_concurrent_creates`

/// Generate the repository contract suite.
///
/// `$factory` must evaluate to a fresh, empty `PaymentRepository`. It is
/// re-evaluated for each test.
#[macro_export]
macro_rules! payment_repository_tests {
    ($factory:expr) => {
        mod payment_repository_contract_tests {
            use super::*;
            use paystore::core::{DEFAULT_STATUS, PaymentError, PaymentService};
            use paystore::query::{QuerySpec, SortDirection};
            use uuid::Uuid;

            #[tokio::test]
            async fn test_create_assigns_server_fields() {
                let service = PaymentService::new($factory);

                let created = service
                    .create(new_payment("invoice-42", "199.99"))
                    .await
                    .unwrap();

                assert_eq!(created.tag, "invoice-42");
                assert_eq!(created.description, "invoice-42 payment");
                assert_eq!(created.amount, decimal("199.99"));
                assert_eq!(created.status, DEFAULT_STATUS);
                assert!(created.created_at.is_some());
                assert!(created.updated_at.is_some());

                let fetched = service.get_by_id(created.id).await.unwrap();
                assert_eq!(fetched.id, created.id);
                assert_eq!(fetched.tag, created.tag);
                assert_eq!(fetched.amount, created.amount);
            }

            #[tokio::test]
            async fn test_get_nonexistent_is_not_found() {
                let service = PaymentService::new($factory);
                let id = Uuid::new_v4();

                let err = service.get_by_id(id).await.unwrap_err();
                assert!(
                    matches!(err, PaymentError::NotFound { id: missing } if missing == id),
                    "expected NotFound, got {:?}",
                    err
                );
            }

            #[tokio::test]
            async fn test_list_empty() {
                let service = PaymentService::new($factory);
                let all = service.get_all(&QuerySpec::new()).await.unwrap();
                assert!(all.is_empty());
            }

            #[tokio::test]
            async fn test_update_status() {
                let service = PaymentService::new($factory);
                let created = seed(&service, &[("rent", "950")]).await.remove(0);

                let updated = service.update_status_by_id(created.id, "paid").await.unwrap();
                assert_eq!(updated.id, created.id);
                assert_eq!(updated.status, "paid");
                assert!(updated.updated_at >= created.updated_at);

                let fetched = service.get_by_id(created.id).await.unwrap();
                assert_eq!(fetched.status, "paid");
            }

            #[tokio::test]
            async fn test_update_status_nonexistent() {
                let service = PaymentService::new($factory);
                let err = service
                    .update_status_by_id(Uuid::new_v4(), "paid")
                    .await
                    .unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {:?}", err);
            }

            #[tokio::test]
            async fn test_delete_is_idempotent() {
                let service = PaymentService::new($factory);
                let created = seed(&service, &[("rent", "1")]).await.remove(0);

                service.delete(created.id).await.unwrap();
                assert!(service.get_by_id(created.id).await.unwrap_err().is_not_found());

                service.delete(created.id).await.unwrap();
                service.delete(Uuid::new_v4()).await.unwrap();
            }

            #[tokio::test]
            async fn test_amount_precision_round_trip() {
                let service = PaymentService::new($factory);
                let created = seed(&service, &[("big", "12345678901234567890.123456789")])
                    .await
                    .remove(0);

                let fetched = service.get_by_id(created.id).await.unwrap();
                assert_eq!(fetched.amount, decimal("12345678901234567890.123456789"));
            }

            #[tokio::test]
            async fn test_search_case_insensitive() {
                let service = PaymentService::new($factory);
                seed(&service, &[("Alice-rent", "10"), ("bob", "20"), ("VALIANT", "30")]).await;

                let spec = QuerySpec::from_params(&params(&[
                    ("search_field", "tag"),
                    ("search_value", "ali"),
                    ("sort_field", "amount"),
                    ("sort_direction", "asc"),
                ]))
                .unwrap();

                let found = service.get_all(&spec).await.unwrap();
                assert_eq!(tags(&found), vec!["Alice-rent", "VALIANT"]);
            }

            #[tokio::test]
            async fn test_search_wildcards_are_literal() {
                let service = PaymentService::new($factory);
                seed(&service, &[("50%_off", "1"), ("500ff", "2"), ("plain", "3")]).await;

                let spec = QuerySpec::new().with_search("tag", "%_");
                let found = service.get_all(&spec).await.unwrap();
                assert_eq!(tags(&found), vec!["50%_off"]);
            }

            #[tokio::test]
            async fn test_filter_merged_values() {
                let service = PaymentService::new($factory);
                let created = seed(&service, &[("a", "1"), ("b", "2"), ("c", "3")]).await;
                service.update_status_by_id(created[1].id, "paid").await.unwrap();
                service.update_status_by_id(created[2].id, "failed").await.unwrap();

                let spec = QuerySpec::from_params(&params(&[
                    ("filter_field", "status"),
                    ("filter_value", "pending"),
                    ("filter_field", "status"),
                    ("filter_value", "paid"),
                    ("sort_field", "tag"),
                    ("sort_direction", "ASC"),
                ]))
                .unwrap();
                assert_eq!(spec.filters().len(), 1);

                let found = service.get_all(&spec).await.unwrap();
                assert_eq!(tags(&found), vec!["a", "b"]);
            }

            #[tokio::test]
            async fn test_range_bounds_inclusive() {
                let service = PaymentService::new($factory);
                seed(&service, &[("low", "9.99"), ("from", "10"), ("mid", "50"), ("to", "100"), ("high", "100.01")]).await;

                let spec = QuerySpec::from_params(&params(&[
                    ("range_field", "amount"),
                    ("from", "10"),
                    ("to", "100"),
                    ("sort_field", "amount"),
                    ("sort_direction", "asc"),
                ]))
                .unwrap();

                let found = service.get_all(&spec).await.unwrap();
                assert_eq!(tags(&found), vec!["from", "mid", "to"]);
            }

            #[tokio::test]
            async fn test_sort_and_paginate() {
                let service = PaymentService::new($factory);
                seed(&service, &[("a", "5"), ("b", "50"), ("c", "0.5"), ("d", "500"), ("e", "5000")]).await;

                let spec = QuerySpec::from_params(&params(&[
                    ("sort_field", "amount"),
                    ("sort_direction", "desc"),
                    ("page", "2"),
                    ("per_page", "2"),
                ]))
                .unwrap();
                let page = service.get_all(&spec).await.unwrap();
                assert_eq!(tags(&page), vec!["b", "a"]);

                let spec = QuerySpec::new()
                    .with_sort("amount", SortDirection::Desc)
                    .with_pagination(paystore::query::Pagination::new(3, 2).unwrap());
                let last = service.get_all(&spec).await.unwrap();
                assert_eq!(tags(&last), vec!["c"]);
            }

            #[tokio::test]
            async fn test_unknown_field_rejected() {
                let service = PaymentService::new($factory);
                let spec = QuerySpec::new().with_sort("amount; DROP TABLE payments", SortDirection::Asc);

                let err = service.get_all(&spec).await.unwrap_err();
                assert!(matches!(err, PaymentError::InvalidQuery(_)), "got {:?}", err);
            }

            #[tokio::test]
            async fn test_concurrent_creates() {
                let service = PaymentService::new($factory);

                let mut handles = Vec::new();
                for i in 0..10 {
                    let service = service.clone();
                    handles.push(tokio::spawn(async move {
                        service
                            .create(new_payment(&format!("concurrent-{}", i), "1"))
                            .await
                    }));
                }

                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let all = service.get_all(&QuerySpec::new()).await.unwrap();
                assert_eq!(all.len(), 10);
            }
        }
    };
}
