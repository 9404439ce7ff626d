//! Bearer-token check for the protected routes

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use breadcrumbs_core::log_warn;

use crate::error::ApiError;
use crate::server::AppState;

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject requests without a configured key
///
/// No configured keys means authentication is off.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.api_keys.is_empty() {
        return Ok(next.run(request).await);
    }
    match bearer_token(&request) {
        Some(token) if state.api_keys.contains(token) => Ok(next.run(request).await),
        _ => {
            log_warn!(state.logger, "[Server] Unauthorized request to {}", request.uri().path());
            Err(ApiError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/v1/tools");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&request(Some("Bearer demo-key-123"))), Some("demo-key-123"));
        assert_eq!(bearer_token(&request(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&request(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request(None)), None);
    }
}
