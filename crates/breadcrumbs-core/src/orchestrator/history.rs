//! Conversation history for one orchestrator run

use std::collections::HashSet;

use crate::types::{ChatMessage, MessageRole, ToolResult};

/// Ordered messages of one conversation
///
/// Tool-result messages can only be appended for call ids requested by an
/// earlier assistant message, so the history never holds an orphaned result.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<ChatMessage>,
    open_calls: HashSet<String>,
}

/// A tool result did not answer any requested call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tool result for unknown call id {0:?}")]
pub struct OrphanedResult(pub String);

impl History {
    /// Seed with a system instruction and the caller's message
    pub fn seed(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            open_calls: HashSet::new(),
        }
    }

    /// Append an assistant message, registering any calls it requests
    pub fn push_assistant(&mut self, message: ChatMessage) {
        debug_assert_eq!(message.role, MessageRole::Assistant);
        self.open_calls
            .extend(message.tool_calls.iter().map(|call| call.id.clone()));
        self.messages.push(message);
    }

    /// Append the result for a requested call
    ///
    /// Each call id can be answered once.
    pub fn push_tool_result(&mut self, result: &ToolResult) -> Result<(), OrphanedResult> {
        if !self.open_calls.remove(&result.call_id) {
            return Err(OrphanedResult(result.call_id.clone()));
        }
        self.messages
            .push(ChatMessage::tool_result(result.call_id.clone(), result.content.clone()));
        Ok(())
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCallRequest;

    #[test]
    fn test_results_pair_with_requested_calls() {
        let mut history = History::seed("sys", "hi");
        let call = ToolCallRequest::new("c1", "vpn_detector", "{}");
        history.push_assistant(ChatMessage::assistant_with_tool_calls("", vec![call.clone()]));

        history.push_tool_result(&ToolResult::success(&call, "ok")).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.messages()[3].tool_call_id.as_deref(), Some("c1"));

        // answered once only
        assert!(history.push_tool_result(&ToolResult::success(&call, "again")).is_err());
    }

    #[test]
    fn test_orphaned_result_rejected() {
        let mut history = History::seed("sys", "hi");
        let stray = ToolCallRequest::new("nope", "dns_lookup", "{}");
        assert_eq!(
            history.push_tool_result(&ToolResult::error(&stray, "x")),
            Err(OrphanedResult("nope".into()))
        );
        assert_eq!(history.len(), 2);
    }
}
