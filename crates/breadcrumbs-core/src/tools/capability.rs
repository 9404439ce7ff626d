//! The capability contract every diagnostic tool implements

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::types::{CancellationToken, ToolDefinition};

use super::arguments::ToolArguments;

/// Errors produced by the registry or by a capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// No capability is registered under this name
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Arguments failed the capability's own validation
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The capability started but could not finish its work
    #[error("{tool} failed: {message}")]
    ExecutionFailed { tool: String, message: String },
}

impl ToolError {
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn execution_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Stable tag for this kind of failure
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "tool_not_found",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::ExecutionFailed { .. } => "execution_failed",
        }
    }
}

pub type ToolOutcome<T> = Result<T, ToolError>;

/// Primitive type of one parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Integer,
    Number,
    Boolean,
    /// A string restricted to the listed values
    Enum(Vec<String>),
}

/// One documented parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Parameter documentation presented to the model
///
/// The registry treats this as advisory; each capability still decodes its
/// arguments strictly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    pub parameters: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// A capability that takes no arguments
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Render as a JSON Schema object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.parameters {
            let mut property = match &spec.kind {
                ParameterKind::String => json!({ "type": "string" }),
                ParameterKind::Integer => json!({ "type": "integer" }),
                ParameterKind::Number => json!({ "type": "number" }),
                ParameterKind::Boolean => json!({ "type": "boolean" }),
                ParameterKind::Enum(values) => json!({ "type": "string", "enum": values }),
            };
            property["description"] = Value::String(spec.description.clone());
            properties.insert(spec.name.clone(), property);
            if spec.required {
                required.push(Value::String(spec.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// A named unit of diagnostic work the model can invoke
///
/// Implementations are stateless with respect to requests and safe to share
/// between concurrent conversations.
#[async_trait]
pub trait ToolCapability: Send + Sync {
    /// Stable dispatch key
    fn name(&self) -> &str;

    /// What the tool does, written for the model
    fn description(&self) -> &str;

    /// Documented parameters
    fn parameters(&self) -> ParameterSchema;

    /// Run the tool
    ///
    /// Must observe `cancel` and return promptly once it fires.
    async fn execute(&self, arguments: ToolArguments, cancel: CancellationToken) -> ToolOutcome<String>;

    /// Catalog entry for this capability
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters().to_json_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rendering() {
        let schema = ParameterSchema::empty()
            .with(ParameterSpec::required("host", ParameterKind::String, "Host name"))
            .with(ParameterSpec::optional(
                "family",
                ParameterKind::Enum(vec!["ipv4".into(), "ipv6".into()]),
                "Address family",
            ));

        let json = schema.to_json_schema();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["host"]["type"], "string");
        assert_eq!(json["properties"]["family"]["enum"][1], "ipv6");
        assert_eq!(json["required"], json!(["host"]));
        assert_eq!(json["additionalProperties"], false);
    }

    #[test]
    fn test_empty_schema_is_an_object() {
        let json = ParameterSchema::empty().to_json_schema();
        assert_eq!(json["properties"], json!({}));
        assert_eq!(json["required"], json!([]));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ToolError::NotFound("x".into()).kind(), "tool_not_found");
        assert_eq!(ToolError::invalid_arguments("x", "bad").kind(), "invalid_arguments");
        assert_eq!(
            ToolError::execution_failed("dns_lookup", "no such host").to_string(),
            "dns_lookup failed: no such host"
        );
    }
}
