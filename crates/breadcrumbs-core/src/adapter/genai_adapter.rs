//! GenaiAdapter - model adapter backed by the genai crate
//!
//! Handles every genai-native provider (OpenAI, Anthropic, Gemini, Ollama, ...)
//! plus OpenAI-compatible endpoints through the ServiceTargetResolver.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatRequest, ChatStreamEvent};
use genai::Client;

use crate::logging::Logger;
use crate::secrets::SecretStore;
use crate::types::{CancellationToken, ChatMessage, ToolCallRequest, ToolDefinition};
use crate::{log_debug, log_error, log_info};

use super::error::{AdapterError, AdapterResult};
use super::genai_convert::{
    create_client, from_genai_tool_call, is_supported, requires_api_key, to_genai_messages,
    to_genai_options, to_genai_tools,
};
use super::traits::{ModelAdapter, ModelSettings};

/// Adapter for all genai-reachable model services
pub struct GenaiAdapter {
    settings: ModelSettings,
    client: Client,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for GenaiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiAdapter")
            .field("provider", &self.settings.provider)
            .field("model", &self.settings.model)
            .finish_non_exhaustive()
    }
}

impl GenaiAdapter {
    /// Build an adapter for the configured provider
    ///
    /// Fails early when the provider is unknown or its key cannot be found.
    pub fn new(
        settings: ModelSettings,
        secrets: Arc<dyn SecretStore>,
        logger: Arc<dyn Logger>,
    ) -> AdapterResult<Self> {
        if !is_supported(&settings) {
            return Err(AdapterError::Config(format!(
                "unknown provider {:?}; set api_base to use an OpenAI-compatible endpoint",
                settings.provider
            )));
        }
        if requires_api_key(&settings.provider)
            && settings.api_key.is_none()
            && !secrets.has(&settings.provider.to_lowercase())
        {
            return Err(AdapterError::missing_api_key(settings.provider.clone()));
        }

        let client = create_client(&settings, secrets);
        Ok(Self {
            settings,
            client,
            logger,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn api_error(&self, message: impl Into<String>) -> AdapterError {
        AdapterError::api_error(self.settings.provider.clone(), message)
    }

    /// Read the stream to its end, collecting text and tool calls
    async fn collect(&self, request: ChatRequest) -> AdapterResult<ChatMessage> {
        let model_name = self.settings.model_name();
        let options = to_genai_options(&self.settings);

        let chat_stream = self
            .client
            .exec_chat_stream(model_name, request, Some(&options))
            .await
            .map_err(|e| self.api_error(e.to_string()))?;
        let mut stream = Box::pin(chat_stream.stream);

        let mut content = String::new();
        let mut tool_calls: Vec<ToolCallRequest> = Vec::new();

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => content.push_str(&chunk.content),
                Ok(ChatStreamEvent::End(end)) => {
                    if let Some(captured) = end.captured_tool_calls() {
                        tool_calls = captured.iter().map(|tc| from_genai_tool_call(tc)).collect();
                    }
                    log_debug!(self.logger, "[GenaiAdapter] Stream event: End");
                }
                Ok(_) => {}
                Err(e) => {
                    log_error!(self.logger, "[GenaiAdapter] Stream error: {}", e);
                    return Err(self.api_error(e.to_string()));
                }
            }
        }

        if tool_calls.is_empty() {
            Ok(ChatMessage::assistant(content))
        } else {
            Ok(ChatMessage::assistant_with_tool_calls(content, tool_calls))
        }
    }
}

#[async_trait]
impl ModelAdapter for GenaiAdapter {
    fn name(&self) -> &str {
        &self.settings.provider
    }

    fn model(&self) -> &str {
        self.settings.model_name()
    }

    async fn complete(
        &self,
        history: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        cancel: CancellationToken,
    ) -> AdapterResult<ChatMessage> {
        log_info!(
            self.logger,
            "[GenaiAdapter] complete: provider={}, model={}, messages={}, tools={}",
            self.settings.provider,
            self.settings.model_name(),
            history.len(),
            tools.map_or(0, |t| t.len())
        );

        let mut request = ChatRequest::new(to_genai_messages(history));
        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            request = request.with_tools(to_genai_tools(tools));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log_info!(self.logger, "[GenaiAdapter] Request cancelled");
                Err(AdapterError::Cancelled)
            }
            result = self.collect(request) => result,
        }
    }
}
