//! Tool arguments with strict per-capability decoding

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::capability::{ToolError, ToolOutcome};

/// The argument string could not be turned into an argument object
#[derive(Error, Debug)]
pub enum ArgumentParseError {
    #[error("arguments are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A JSON object of named argument values
///
/// Values keep their JSON type (`serde_json::Value` is the tagged union);
/// capabilities read them only through [`ToolArguments::decode`], which
/// either produces the capability's typed argument struct or fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a model-produced argument string
    ///
    /// A blank string means "no arguments", which models emit for
    /// parameterless tools.
    pub fn parse(raw: &str) -> Result<Self, ArgumentParseError> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// Wrap an already-parsed JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ArgumentParseError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            Value::Bool(_) => Err(ArgumentParseError::NotAnObject("a boolean")),
            Value::Number(_) => Err(ArgumentParseError::NotAnObject("a number")),
            Value::String(_) => Err(ArgumentParseError::NotAnObject("a string")),
            Value::Array(_) => Err(ArgumentParseError::NotAnObject("an array")),
        }
    }

    /// Add one value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Decode into a capability's argument type, failing with `InvalidArguments`
    ///
    /// Argument types should use `#[serde(deny_unknown_fields)]` so
    /// misspelled keys are rejected instead of ignored.
    pub fn decode<T: DeserializeOwned>(&self, tool: &str) -> ToolOutcome<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ToolError::invalid_arguments(tool, e.to_string()))
    }
}

/// Argument type for capabilities that take no parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoArguments {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct ProbeArgs {
        host: String,
        port: u16,
        #[serde(default)]
        timeout_ms: Option<u64>,
    }

    #[test]
    fn test_blank_string_is_empty_object() {
        assert!(ToolArguments::parse("").unwrap().is_empty());
        assert!(ToolArguments::parse("  \n").unwrap().is_empty());
        assert!(ToolArguments::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_invalid_json_and_non_objects() {
        assert!(matches!(ToolArguments::parse("{host:"), Err(ArgumentParseError::Json(_))));
        assert!(matches!(
            ToolArguments::parse("[1,2]"),
            Err(ArgumentParseError::NotAnObject("an array"))
        ));
    }

    #[test]
    fn test_decode_typed_arguments() {
        let args = ToolArguments::parse(r#"{"host":"example.com","port":443}"#).unwrap();
        let decoded: ProbeArgs = args.decode("tcp_probe").unwrap();
        assert_eq!(
            decoded,
            ProbeArgs { host: "example.com".into(), port: 443, timeout_ms: None }
        );
    }

    #[test]
    fn test_decode_rejects_wrong_type_instead_of_defaulting() {
        let args = ToolArguments::new().with("host", "example.com").with("port", "443");
        let err = args.decode::<ProbeArgs>("tcp_probe").unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref tool, .. } if tool == "tcp_probe"));
    }

    #[test]
    fn test_decode_rejects_out_of_range_and_unknown_keys() {
        let args = ToolArguments::from_value(json!({"host": "a", "port": 70000})).unwrap();
        assert!(args.decode::<ProbeArgs>("tcp_probe").is_err());

        let args = ToolArguments::from_value(json!({"host": "a", "port": 1, "prot": 2})).unwrap();
        assert!(args.decode::<ProbeArgs>("tcp_probe").is_err());
    }

    #[test]
    fn test_no_arguments() {
        assert!(ToolArguments::new().decode::<NoArguments>("vpn_detector").is_ok());
        let extra = ToolArguments::new().with("verbose", true);
        assert!(extra.decode::<NoArguments>("vpn_detector").is_err());
    }
}
