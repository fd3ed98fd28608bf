//! ServerBuilder for fluent API to build the payment HTTP server

use super::auth::BearerAuth;
use super::router::build_payment_routes;
use crate::core::{PaymentRepository, PaymentService};
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Builder for the payment server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new(PostgresPaymentRepository::new(pool))
///     .with_auth_token(config.auth_token.clone())
///     .with_operation_timeout(config.operation_timeout())
///     .serve(config.listen_addr())
///     .await?;
/// ```
pub struct ServerBuilder<R> {
    repository: R,
    auth_token: Option<String>,
    operation_timeout: Option<Duration>,
    custom_routes: Vec<Router>,
}

impl<R: PaymentRepository> ServerBuilder<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            auth_token: None,
            operation_timeout: None,
            custom_routes: Vec::new(),
        }
    }

    /// Require `Authorization: Bearer <token>` on API routes
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Merge extra routes into the app; they are not behind the bearer check
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        let auth = BearerAuth::new(self.auth_token);
        if !auth.is_enabled() {
            tracing::warn!("AUTH_TOKEN is not set, API routes are unauthenticated");
        }

        let service =
            PaymentService::new(self.repository).with_operation_timeout(self.operation_timeout);

        let mut app = build_payment_routes(service, auth);
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }
        app
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C); in-flight requests finish
    /// before this returns.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryPaymentRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_custom_routes_are_merged() {
        let custom = Router::new().route("/version", axum::routing::get(|| async { "1" }));
        let app = ServerBuilder::new(InMemoryPaymentRepository::new())
            .with_auth_token(Some("t".to_string()))
            .with_custom_routes(custom)
            .build();

        let response = app
            .oneshot(Request::get("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_public_when_auth_enabled() {
        let app = ServerBuilder::new(InMemoryPaymentRepository::new())
            .with_auth_token(Some("t".to_string()))
            .build();

        let health = app
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let api = app
            .oneshot(Request::get("/api/v1/payments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
    }
}
