//! Adapter error types

use thiserror::Error;

/// Errors from a model adapter
///
/// Every variant is fatal to the conversation that hit it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// No credential is configured or stored for the provider
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// The model service rejected the request or the transport failed
    #[error("{provider} API error: {message}")]
    ApiError { provider: String, message: String },

    /// The model answered with something the orchestrator cannot use
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The adapter could not be built from its settings
    #[error("Invalid model configuration: {0}")]
    Config(String),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,
}

impl AdapterError {
    pub fn api_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;
