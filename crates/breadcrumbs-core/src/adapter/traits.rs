//! Model adapter trait and settings

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{CancellationToken, ChatMessage, ToolDefinition};
use super::error::AdapterResult;

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Which model to talk to and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Provider id (`openai`, `anthropic`, `ollama`, ..., or `mock`)
    pub provider: String,
    /// Model name as the provider knows it; a `provider/` prefix is stripped
    pub model: String,
    /// Explicit API key; when absent the secret store is asked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ModelSettings {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Model name without a `provider/` prefix
    pub fn model_name(&self) -> &str {
        match self.model.split_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => &self.model,
        }
    }
}

/// Boundary to a remote language model
///
/// One call is one round: the full history (and optionally the tool catalog)
/// goes out, one assistant message comes back. Implementations hold no
/// per-call state and are shared across concurrent conversations.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Provider id, for logs
    fn name(&self) -> &str;

    /// Model name, for logs and health output
    fn model(&self) -> &str;

    /// Produce the next assistant message
    ///
    /// `tools: None` means the model must answer in text only.
    async fn complete(
        &self,
        history: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        cancel: CancellationToken,
    ) -> AdapterResult<ChatMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_strips_prefix() {
        assert_eq!(ModelSettings::new("openai", "openai/gpt-4o").model_name(), "gpt-4o");
        assert_eq!(ModelSettings::new("ollama", "llama3.1").model_name(), "llama3.1");
        assert_eq!(ModelSettings::new("openai", "trailing/").model_name(), "trailing/");
    }

    #[test]
    fn test_settings_from_partial_yaml() {
        let settings: ModelSettings = serde_yaml::from_str("provider: anthropic\ntemperature: 0.2\n").unwrap();
        assert_eq!(settings.provider, "anthropic");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.temperature, Some(0.2));
    }
}
