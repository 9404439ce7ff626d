//! Orchestrator error types

use std::time::Duration;

use thiserror::Error;

use crate::adapter::AdapterError;

/// Request-fatal failures of a conversation
///
/// Tool failures never appear here; they are returned to the model as data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The model call failed or returned an unusable shape
    #[error("model adapter failed: {0}")]
    Adapter(AdapterError),

    /// The overall deadline passed before an answer was produced
    #[error("no answer within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The caller cancelled the conversation
    #[error("conversation cancelled")]
    Cancelled,

    /// The history would have broken its pairing rule
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AdapterError> for OrchestratorError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Cancelled => OrchestratorError::Cancelled,
            other => OrchestratorError::Adapter(other),
        }
    }
}

impl OrchestratorError {
    /// Stable tag for this kind of failure
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorError::Adapter(_) => "adapter_failure",
            OrchestratorError::Timeout(_) => "timeout",
            OrchestratorError::Cancelled => "cancelled",
            OrchestratorError::Internal(_) => "internal",
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_cancellation_maps_to_cancelled() {
        assert_eq!(OrchestratorError::from(AdapterError::Cancelled), OrchestratorError::Cancelled);
        assert_eq!(
            OrchestratorError::from(AdapterError::api_error("openai", "503")).kind(),
            "adapter_failure"
        );
        assert_eq!(OrchestratorError::Timeout(Duration::from_secs(30)).to_string(), "no answer within 30s");
    }
}
