//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog entry describing one capability to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "parameters")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Tool invocation requested by the model
///
/// The argument string is kept exactly as the model produced it and only
/// decoded when the call is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Identifier, unique within one assistant turn
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Serialized arguments
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Outcome of one tool call, ready to become a tool-role message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this is responding to
    #[serde(rename = "callId")]
    pub call_id: String,
    /// Name of the tool that was requested
    pub name: String,
    /// The result content
    pub content: String,
    /// Whether this result represents an error
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(call: &ToolCallRequest, content: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error tool result
    pub fn error(call: &ToolCallRequest, error: impl std::fmt::Display) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: format!("Error: {}", error),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_serializes_schema_as_parameters() {
        let def = ToolDefinition::new("dns_lookup", "Resolve a host", json!({"type": "object"}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["parameters"]["type"], "object");
    }

    #[test]
    fn test_tool_result() {
        let call = ToolCallRequest::new("call_123", "dns_lookup", "{}");
        let success = ToolResult::success(&call, "93.184.216.34");
        assert!(!success.is_error);
        assert_eq!(success.call_id, "call_123");

        let error = ToolResult::error(&call, "host not found");
        assert!(error.is_error);
        assert_eq!(error.content, "Error: host not found");
    }
}
