//! Language-model adapters
//!
//! An adapter turns the orchestrator's history and tool catalog into one
//! request to a model service and the reply into one assistant message.
//!
//! ## Architecture
//!
//! All real providers go through the `genai` crate, which handles:
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, Ollama, etc.)
//! - Streaming and tool-call capture
//!
//! OpenAI-compatible services (OpenRouter, Mistral, or any `api_base`) are
//! routed with genai's `ServiceTargetResolver`. Keys come from the injected
//! `SecretStore`.
//!
//! `MockAdapter` is kept for tests and offline runs.

mod error;
mod genai_adapter;
mod genai_convert;
mod mock;
mod traits;

pub use error::{AdapterError, AdapterResult};
pub use genai_adapter::GenaiAdapter;
pub use genai_convert::{default_api_base, native_adapter_kind};
pub use mock::{MockAdapter, MockMode, RecordedCall};
pub use traits::{ModelAdapter, ModelSettings, DEFAULT_MODEL, DEFAULT_PROVIDER};

use std::sync::Arc;

use crate::logging::Logger;
use crate::secrets::SecretStore;

/// Create the adapter named by `settings.provider`
///
/// `mock` gives an echoing `MockAdapter`; every other provider goes through
/// `GenaiAdapter`.
pub fn create_adapter(
    settings: &ModelSettings,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
) -> AdapterResult<Arc<dyn ModelAdapter>> {
    match settings.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockAdapter::echo(logger))),
        _ => Ok(Arc::new(GenaiAdapter::new(settings.clone(), secrets, logger)?)),
    }
}

/// Provider ids accepted in configuration
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        "openrouter",
        "mistral",
        "mock",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_create_mock_adapter() {
        let adapter = create_adapter(
            &ModelSettings::new("mock", "echo"),
            Arc::new(MemorySecretStore::new()),
            Arc::new(NoOpLogger::new()),
        )
        .unwrap();
        assert_eq!(adapter.name(), "mock");
    }

    #[test]
    fn test_create_genai_adapter_needs_key() {
        let result = create_adapter(
            &ModelSettings::new("openai", "gpt-4o-mini"),
            Arc::new(MemorySecretStore::new()),
            Arc::new(NoOpLogger::new()),
        );
        assert!(matches!(result, Err(AdapterError::MissingApiKey { .. })));
    }
}
