//! REST integration test macro for payment backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that
//! validate a `PaymentRepository` through full REST round-trips:
//! JSON → HTTP request → handler → PaymentService → repository → envelope.
//!
//! # Generated Tests
//!
//! - `test_rest_create`: POST 201, server-assigned fields in `data`
//! - `test_rest_create_numeric_amount`: fractional JSON numbers keep every digit
//! - `test_rest_get`: GET 200
//! - `test_rest_list_query`: search + filter + sort + pagination, query echoed in `meta`
//! - `test_rest_update_status`: PUT 200, then 404 for an unknown id
//! - `test_rest_delete`: DELETE 202, then GET 404
//! - `test_rest_invalid_query`: unknown sort field → 400
//! - `test_rest_invalid_uuid`: malformed id → 422
//! - `test_rest_invalid_body`: malformed JSON and failed validation → 422
//! - `test_rest_auth`: missing/wrong bearer token → 401, `/healthz` stays open

/// Generate a REST integration test suite for a storage backend.
///
/// `$repository_factory` must produce a fresh, empty `PaymentRepository`.
#[macro_export]
macro_rules! rest_integration_tests {
    ($repository_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use paystore::server::ServerBuilder;
            use serde_json::{Value, json};

            const TOKEN: &str = "test-token";

            async fn make_server() -> TestServer {
                let router = ServerBuilder::new($repository_factory)
                    .with_auth_token(Some(TOKEN.to_string()))
                    .build();
                TestServer::new(router)
            }

            fn bearer() -> String {
                format!("Bearer {}", TOKEN)
            }

            async fn create(server: &TestServer, tag: &str, amount: &str) -> Value {
                let response = server
                    .post("/api/v1/payments")
                    .authorization(bearer())
                    .json(&json!({ "tag": tag, "description": "via rest", "amount": amount }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()["data"].clone()
            }

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let response = server
                    .post("/api/v1/payments")
                    .authorization(bearer())
                    .json(&json!({ "tag": "rent", "description": "June", "amount": "950.10" }))
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["status"], "success");
                assert_eq!(body["entity"], "payments");
                assert_eq!(body["state"], "createPayment");
                assert_eq!(body["data"]["tag"], "rent");
                assert_eq!(body["data"]["amount"], "950.10");
                assert_eq!(body["data"]["status"], "pending");
                uuid::Uuid::parse_str(body["data"]["id"].as_str().unwrap()).unwrap();
            }

            #[tokio::test]
            async fn test_rest_create_numeric_amount() {
                let server = make_server().await;

                for (raw, expected) in [
                    (r#"{"tag":"tip","amount":0.1}"#, "0.1"),
                    (
                        r#"{"tag":"bond","amount":12345678901234567890123456789.987654321}"#,
                        "12345678901234567890123456789.987654321",
                    ),
                ] {
                    let response = server
                        .post("/api/v1/payments")
                        .authorization(bearer())
                        .text(raw)
                        .content_type("application/json")
                        .await;
                    response.assert_status(StatusCode::CREATED);

                    let id = response.json::<Value>()["data"]["id"].as_str().unwrap().to_string();
                    let fetched = server
                        .get(&format!("/api/v1/payments/{}", id))
                        .authorization(bearer())
                        .await;
                    fetched.assert_status_ok();
                    assert_eq!(fetched.json::<Value>()["data"]["amount"], expected);
                }
            }

            #[tokio::test]
            async fn test_rest_get() {
                let server = make_server().await;
                let created = create(&server, "rent", "10").await;
                let id = created["id"].as_str().unwrap();

                let response = server
                    .get(&format!("/api/v1/payments/{}", id))
                    .authorization(bearer())
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["state"], "getPaymentByID");
                assert_eq!(body["data"]["id"], id);

                let missing = server
                    .get(&format!("/api/v1/payments/{}", uuid::Uuid::new_v4()))
                    .authorization(bearer())
                    .await;
                missing.assert_status_not_found();
                let body: Value = missing.json();
                assert_eq!(body["status"], "failed");
                assert_eq!(body["error"]["code"], "PAYMENT_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_list_query() {
                let server = make_server().await;
                for (tag, amount) in [("alice-1", "5"), ("alice-2", "50"), ("bob", "500"), ("alina", "0.5")] {
                    create(&server, tag, amount).await;
                }

                let response = server
                    .get("/api/v1/payments?search_field=tag&search_value=ALI&filter_field=status&filter_value=pending&sort_field=amount&sort_direction=desc&page=1&per_page=2")
                    .authorization(bearer())
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["state"], "getAllPayments");
                let tags: Vec<&str> = body["data"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|p| p["tag"].as_str().unwrap())
                    .collect();
                assert_eq!(tags, vec!["alice-2", "alice-1"]);
                assert_eq!(body["meta"]["count"], 2);
                assert_eq!(body["meta"]["query"]["search"]["field"], "tag");
                assert_eq!(body["meta"]["query"]["sort"]["direction"], "DESC");
                assert_eq!(body["meta"]["query"]["pagination"]["per_page"], 2);
            }

            #[tokio::test]
            async fn test_rest_update_status() {
                let server = make_server().await;
                let created = create(&server, "rent", "10").await;
                let id = created["id"].as_str().unwrap();

                let response = server
                    .put(&format!("/api/v1/payments/status/{}", id))
                    .authorization(bearer())
                    .json(&json!({ "status": "paid" }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["state"], "updatePaymentByID");
                assert_eq!(body["data"]["status"], "paid");

                let missing = server
                    .put(&format!("/api/v1/payments/status/{}", uuid::Uuid::new_v4()))
                    .authorization(bearer())
                    .json(&json!({ "status": "paid" }))
                    .await;
                missing.assert_status_not_found();
            }

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;
                let created = create(&server, "rent", "10").await;
                let id = created["id"].as_str().unwrap();

                let response = server
                    .delete(&format!("/api/v1/payments/{}", id))
                    .authorization(bearer())
                    .await;
                response.assert_status(StatusCode::ACCEPTED);
                assert_eq!(response.json::<Value>()["state"], "deletePaymentByID");

                server
                    .get(&format!("/api/v1/payments/{}", id))
                    .authorization(bearer())
                    .await
                    .assert_status_not_found();
            }

            #[tokio::test]
            async fn test_rest_invalid_query() {
                let server = make_server().await;

                let response = server
                    .get("/api/v1/payments?sort_field=password&sort_direction=asc")
                    .authorization(bearer())
                    .await;
                response.assert_status_bad_request();
                let body: Value = response.json();
                assert_eq!(body["error"]["code"], "INVALID_QUERY");
                assert_eq!(body["error"]["details"]["key"], "sort_field");

                let response = server
                    .get("/api/v1/payments?filter_field=status&filter_field=tag&filter_value=paid")
                    .authorization(bearer())
                    .await;
                response.assert_status_bad_request();
                assert_eq!(response.json::<Value>()["error"]["details"]["key"], "filter_value");
            }

            #[tokio::test]
            async fn test_rest_invalid_uuid() {
                let server = make_server().await;

                let response = server
                    .get("/api/v1/payments/not-a-uuid")
                    .authorization(bearer())
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
            }

            #[tokio::test]
            async fn test_rest_invalid_body() {
                let server = make_server().await;

                let malformed = server
                    .post("/api/v1/payments")
                    .authorization(bearer())
                    .text("{not json")
                    .content_type("application/json")
                    .await;
                malformed.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(malformed.json::<Value>()["error"]["code"], "INVALID_BODY");

                let invalid = server
                    .post("/api/v1/payments")
                    .authorization(bearer())
                    .json(&json!({ "tag": "", "amount": "-5" }))
                    .await;
                invalid.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                let body: Value = invalid.json();
                assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
                let fields: Vec<&str> = body["error"]["details"]["fields"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|f| f["field"].as_str().unwrap())
                    .collect();
                assert_eq!(fields, vec!["amount", "tag"]);
            }

            #[tokio::test]
            async fn test_rest_auth() {
                let server = make_server().await;

                server.get("/healthz").await.assert_status_ok();

                let missing = server.get("/api/v1/payments").await;
                missing.assert_status_unauthorized();
                assert_eq!(missing.json::<Value>()["error"]["code"], "UNAUTHORIZED");

                server
                    .get("/api/v1/payments")
                    .authorization("Bearer wrong")
                    .await
                    .assert_status_unauthorized();
            }
        }
    };
}
