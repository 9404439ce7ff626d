//! The two-round conversation loop

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::adapter::{AdapterError, ModelAdapter};
use crate::logging::Logger;
use crate::tools::ToolRegistry;
use crate::types::{CancellationToken, ChatMessage, ToolCallRequest, ToolDefinition};
use crate::{log_debug, log_info, log_warn};

use super::error::{OrchestratorError, OrchestratorResult};
use super::history::History;

/// Instruction that opens every conversation
pub const SYSTEM_INSTRUCTION: &str = "You are Breadcrumbs, a diagnostics assistant for this \
machine's network and application state. When a question depends on the machine's current \
state, call the available tools instead of guessing, then answer from their results. If a tool \
reports an error, say what could not be checked. Keep answers short and concrete.";

/// Final answer of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationOutcome {
    pub answer: String,
    /// Every tool name the model requested, in request order, duplicates kept
    pub tools_used: Vec<String>,
}

/// Drives one question through the model and the tools
///
/// Holds no per-conversation state; one instance serves concurrent runs.
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    adapter: Arc<dyn ModelAdapter>,
    logger: Arc<dyn Logger>,
    system_prompt: String,
}

impl Orchestrator {
    pub fn new(registry: Arc<ToolRegistry>, adapter: Arc<dyn ModelAdapter>, logger: Arc<dyn Logger>) -> Self {
        Self {
            registry,
            adapter,
            logger,
            system_prompt: SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Replace the opening instruction
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn adapter(&self) -> &Arc<dyn ModelAdapter> {
        &self.adapter
    }

    /// Run with an overall deadline
    ///
    /// When the deadline passes, in-flight tool executions and the pending
    /// model call are cancelled and `Timeout` is returned; no partial answer.
    pub async fn run_with_deadline(
        &self,
        message: &str,
        tools_enabled: bool,
        deadline: Duration,
    ) -> OrchestratorResult<ConversationOutcome> {
        let cancel = CancellationToken::new();
        match tokio::time::timeout(deadline, self.run(message, tools_enabled, cancel.clone())).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                log_warn!(self.logger, "[Orchestrator] Deadline of {:?} exceeded", deadline);
                Err(OrchestratorError::Timeout(deadline))
            }
        }
    }

    /// Run one conversation to its final answer
    pub async fn run(
        &self,
        message: &str,
        tools_enabled: bool,
        cancel: CancellationToken,
    ) -> OrchestratorResult<ConversationOutcome> {
        let mut history = History::seed(self.system_prompt.clone(), message);
        let catalog = tools_enabled.then(|| self.registry.definitions());

        // Round 1
        let first = self.call_model(&history, catalog.as_deref(), &cancel, 1).await?;
        if !first.has_tool_calls() {
            return Ok(ConversationOutcome {
                answer: first.content,
                tools_used: Vec::new(),
            });
        }
        if !tools_enabled {
            log_warn!(
                self.logger,
                "[Orchestrator] Ignoring {} tool call(s) requested without a catalog",
                first.tool_calls.len()
            );
            return Ok(ConversationOutcome {
                answer: first.content,
                tools_used: Vec::new(),
            });
        }

        self.check_tool_calls(&first.tool_calls)?;
        let calls: Vec<ToolCallRequest> = first.tool_calls.clone();
        let tools_used: Vec<String> = calls.iter().map(|call| call.name.clone()).collect();
        history.push_assistant(first);

        log_info!(self.logger, "[Orchestrator] Executing tools: {}", tools_used.join(", "));
        let results = self.registry.execute_tool_calls(&calls, cancel.clone()).await;
        if cancel.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }
        for result in &results {
            if result.is_error {
                log_debug!(self.logger, "[Orchestrator] {} ({}) failed: {}", result.name, result.call_id, result.content);
            }
            history
                .push_tool_result(result)
                .map_err(|e| OrchestratorError::Internal(e.to_string()))?;
        }

        // Round 2, text only
        let second = self.call_model(&history, None, &cancel, 2).await?;
        if second.has_tool_calls() {
            log_warn!(
                self.logger,
                "[Orchestrator] Ignoring {} tool call(s) in the final round",
                second.tool_calls.len()
            );
        }

        Ok(ConversationOutcome {
            answer: second.content,
            tools_used,
        })
    }

    async fn call_model(
        &self,
        history: &History,
        catalog: Option<&[ToolDefinition]>,
        cancel: &CancellationToken,
        round: u8,
    ) -> OrchestratorResult<ChatMessage> {
        log_debug!(
            self.logger,
            "[Orchestrator] Round {}: {} messages, catalog={}",
            round,
            history.len(),
            catalog.is_some()
        );
        let reply = self
            .adapter
            .complete(history.messages(), catalog, cancel.clone())
            .await
            .map_err(|e| {
                log_warn!(self.logger, "[Orchestrator] Round {} failed: {}", round, e);
                OrchestratorError::from(e)
            })?;
        Ok(reply)
    }

    /// Tool calls must carry a name and an id unique within the turn
    fn check_tool_calls(&self, calls: &[ToolCallRequest]) -> OrchestratorResult<()> {
        let mut seen = HashSet::new();
        for call in calls {
            let problem = if call.name.trim().is_empty() {
                Some(format!("tool call {:?} has no name", call.id))
            } else if call.id.is_empty() {
                Some(format!("call to {} has no id", call.name))
            } else if !seen.insert(call.id.as_str()) {
                Some(format!("tool call id {:?} is repeated", call.id))
            } else {
                None
            };
            if let Some(message) = problem {
                return Err(OrchestratorError::Adapter(AdapterError::invalid_response(
                    self.adapter.name(),
                    message,
                )));
            }
        }
        Ok(())
    }
}
