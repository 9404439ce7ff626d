//! Mock adapter for testing
//!
//! Provides deterministic, configurable responses without network
//! dependencies. Unlike real adapters it records every call, so tests can
//! assert on how many rounds ran and what each round was given.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{AdapterError, AdapterResult};
use super::traits::ModelAdapter;
use crate::logging::Logger;
use crate::log_debug;
use crate::types::{CancellationToken, ChatMessage, MessageRole, ToolDefinition};

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Answer with the last user message
    #[default]
    Echo,
    /// Answer every call with the same text
    Fixed(String),
    /// Answer each call with the next scripted message; running out is an error
    Script(Vec<ChatMessage>),
    /// Fail every call
    Error(String),
}

/// One recorded `complete` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub history: Vec<ChatMessage>,
    /// Names of the tools offered, `None` when no catalog was passed
    pub tools: Option<Vec<String>>,
}

/// Mock model adapter for testing and offline use
pub struct MockAdapter {
    mode: MockMode,
    delay: Duration,
    script: Mutex<VecDeque<ChatMessage>>,
    calls: Mutex<Vec<RecordedCall>>,
    logger: Arc<dyn Logger>,
}

impl MockAdapter {
    pub fn new(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        let script = match &mode {
            MockMode::Script(messages) => messages.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            mode,
            delay: Duration::ZERO,
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Echo the last user message back
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Echo, logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Fixed(response.into()), logger)
    }

    pub fn scripted(responses: Vec<ChatMessage>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Script(responses), logger)
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Error(message.into()), logger)
    }

    /// Wait this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn respond(&self, history: &[ChatMessage]) -> AdapterResult<ChatMessage> {
        match &self.mode {
            MockMode::Echo => {
                let last_user = history
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::User && !m.content.is_empty())
                    .map(|m| m.content.clone())
                    .unwrap_or_else(|| "Hello from MockAdapter!".to_string());
                Ok(ChatMessage::assistant(last_user))
            }
            MockMode::Fixed(text) => Ok(ChatMessage::assistant(text.clone())),
            MockMode::Script(_) => self
                .script
                .lock()
                .pop_front()
                .ok_or_else(|| AdapterError::invalid_response("mock", "script exhausted")),
            MockMode::Error(message) => Err(AdapterError::api_error("mock", message.clone())),
        }
    }
}

#[async_trait]
impl ModelAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        match self.mode {
            MockMode::Echo => "echo",
            MockMode::Fixed(_) => "fixed",
            MockMode::Script(_) => "script",
            MockMode::Error(_) => "error",
        }
    }

    async fn complete(
        &self,
        history: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        cancel: CancellationToken,
    ) -> AdapterResult<ChatMessage> {
        self.calls.lock().push(RecordedCall {
            history: history.to_vec(),
            tools: tools.map(|t| t.iter().map(|d| d.name.clone()).collect()),
        });
        log_debug!(
            self.logger,
            "[MockAdapter] complete: {} messages, catalog={}",
            history.len(),
            tools.is_some()
        );

        if !self.delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AdapterError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(AdapterError::Cancelled);
        }

        self.respond(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::ToolCallRequest;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    #[tokio::test]
    async fn test_echo() {
        let adapter = MockAdapter::echo(logger());
        let history = vec![ChatMessage::system("sys"), ChatMessage::user("ping")];
        let reply = adapter.complete(&history, None, CancellationToken::new()).await.unwrap();
        assert_eq!(reply.content, "ping");
        assert_eq!(reply.role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_script_and_recording() {
        let adapter = MockAdapter::scripted(
            vec![
                ChatMessage::assistant_with_tool_calls("", vec![ToolCallRequest::new("c1", "vpn_detector", "{}")]),
                ChatMessage::assistant("done"),
            ],
            logger(),
        );
        let catalog = vec![ToolDefinition::new("vpn_detector", "d", serde_json::json!({}))];

        let first = adapter
            .complete(&[ChatMessage::user("q")], Some(&catalog), CancellationToken::new())
            .await
            .unwrap();
        assert!(first.has_tool_calls());
        let second = adapter.complete(&[], None, CancellationToken::new()).await.unwrap();
        assert_eq!(second.content, "done");
        assert!(adapter.complete(&[], None, CancellationToken::new()).await.is_err());

        let calls = adapter.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].tools, Some(vec!["vpn_detector".to_string()]));
        assert_eq!(calls[1].tools, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_observes_cancellation() {
        let adapter = MockAdapter::fixed("late", logger()).with_delay(Duration::from_secs(60));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = adapter.complete(&[], None, cancel).await.unwrap_err();
        assert_eq!(err, AdapterError::Cancelled);
    }

    #[tokio::test]
    async fn test_error_mode() {
        let adapter = MockAdapter::error("boom", logger());
        let err = adapter.complete(&[], None, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, AdapterError::api_error("mock", "boom"));
    }
}
