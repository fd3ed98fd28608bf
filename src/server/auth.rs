//! Bearer-token authentication for the `/api` routes

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::response::ApiFailure;
use crate::core::error::RequestError;

/// The token every API request must present; `None` disables the check
#[derive(Debug, Clone, Default)]
pub struct BearerAuth {
    token: Option<Arc<str>>,
}

impl BearerAuth {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Check an `Authorization` header value
    pub fn check(&self, header: Option<&str>) -> Result<(), RequestError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };

        let provided = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| RequestError::Unauthorized {
                message: "missing bearer token".to_string(),
            })?;

        if provided != expected {
            return Err(RequestError::Unauthorized {
                message: "invalid bearer token".to_string(),
            });
        }
        Ok(())
    }
}

/// Middleware rejecting requests without the configured bearer token
pub async fn require_bearer(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    auth.check(header)
        .map_err(ApiFailure::at("authorize"))?;

    Ok(next.run(request).await)
}
