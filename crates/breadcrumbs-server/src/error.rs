//! Error types for the HTTP surface and the binary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use breadcrumbs_core::{AdapterError, ConfigError, FrontDoorError, SignalError};

/// Error returned by a route, rendered as `{error, kind}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "missing or invalid bearer token")
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }
}

impl From<FrontDoorError> for ApiError {
    fn from(e: FrontDoorError) -> Self {
        let kind = e.kind();
        let status = match kind {
            "invalid_input" | "invalid_arguments" => StatusCode::BAD_REQUEST,
            "tool_not_found" => StatusCode::NOT_FOUND,
            "busy" => StatusCode::SERVICE_UNAVAILABLE,
            "adapter_failure" => StatusCode::BAD_GATEWAY,
            "timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, kind, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "kind": self.kind,
        }));
        (self.status, body).into_response()
    }
}

/// Failures that stop a command before or while it runs
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Request(#[from] FrontDoorError),

    #[error("could not serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use breadcrumbs_core::{OrchestratorError, ToolError};
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FrontDoorError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (FrontDoorError::Busy(4), StatusCode::SERVICE_UNAVAILABLE),
            (FrontDoorError::ToolNotFound("x".into()), StatusCode::NOT_FOUND),
            (
                FrontDoorError::Tool(ToolError::invalid_arguments("dns_lookup", "host")),
                StatusCode::BAD_REQUEST,
            ),
            (
                FrontDoorError::Tool(ToolError::execution_failed("dns_lookup", "nx")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                OrchestratorError::Adapter(AdapterError::api_error("openai", "500")).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                OrchestratorError::Timeout(Duration::from_secs(30)).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }
}
