//! Tool registry: catalog, lookup and dispatch
//!
//! The ToolRegistry is the central component for:
//! - Holding the capabilities registered at startup (and any added later)
//! - Presenting their catalog to the model
//! - Executing model-requested calls with per-call failure isolation

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use thiserror::Error;

use crate::logging::Logger;
use crate::system::SystemSignals;
use crate::types::{CancellationToken, ToolCallRequest, ToolDefinition, ToolResult};
use crate::{log_debug, log_info, log_warn};

use super::arguments::ToolArguments;
use super::capability::{ToolCapability, ToolError, ToolOutcome};
use super::dns::DnsLookupTool;
use super::interfaces::NetworkInterfacesTool;
use super::tcp_probe::TcpProbeTool;
use super::vpn::VpnDetectorTool;

/// Registration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a tool named {0} is already registered")]
    Duplicate(String),

    #[error("tool names must be non-empty and contain only [a-z0-9_], got {0:?}")]
    InvalidName(String),

    #[error("tool {0} has an empty description")]
    MissingDescription(String),
}

/// Catalog of capabilities
///
/// Append-only: capabilities are never removed or replaced, so a name seen
/// once keeps resolving to the same capability. Lookups take a read lock and
/// clone an `Arc`, so many conversations can dispatch concurrently.
pub struct ToolRegistry {
    tools: RwLock<Vec<Arc<dyn ToolCapability>>>,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            tools: RwLock::new(Vec::new()),
            logger,
        }
    }

    /// Create a registry holding the built-in diagnostic tools
    pub fn with_builtin_tools(signals: Arc<dyn SystemSignals>, logger: Arc<dyn Logger>) -> Self {
        let registry = Self::new(Arc::clone(&logger));
        let builtins: Vec<Arc<dyn ToolCapability>> = vec![
            Arc::new(VpnDetectorTool::new(Arc::clone(&signals), Arc::clone(&logger))),
            Arc::new(NetworkInterfacesTool::new(Arc::clone(&signals))),
            Arc::new(DnsLookupTool::new()),
            Arc::new(TcpProbeTool::new()),
        ];
        for tool in builtins {
            // Built-in names are distinct constants; a clash is a programming error worth a log line.
            if let Err(e) = registry.register(tool) {
                log_warn!(logger, "[ToolRegistry] Skipping built-in tool: {}", e);
            }
        }
        registry
    }

    /// Add a capability
    pub fn register(&self, tool: Arc<dyn ToolCapability>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(RegistryError::InvalidName(name));
        }
        if tool.description().trim().is_empty() {
            return Err(RegistryError::MissingDescription(name));
        }

        let mut tools = self.tools.write();
        if tools.iter().any(|t| t.name() == name) {
            return Err(RegistryError::Duplicate(name));
        }
        tools.push(tool);
        log_info!(self.logger, "[ToolRegistry] Registered tool: {}", name);
        Ok(())
    }

    /// Look up a capability by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolCapability>> {
        self.tools.read().iter().find(|t| t.name() == name).cloned()
    }

    /// Catalog entries in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.read().iter().map(|t| t.definition()).collect()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.tools.read().iter().map(|t| t.name().to_string()).collect()
    }

    /// Get count of registered tools
    pub fn tool_count(&self) -> usize {
        self.tools.read().len()
    }

    /// Execute a capability by name
    ///
    /// An unknown name fails with `ToolError::NotFound` before anything runs.
    pub async fn execute(
        &self,
        name: &str,
        arguments: ToolArguments,
        cancel: CancellationToken,
    ) -> ToolOutcome<String> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        log_info!(self.logger, "[ToolRegistry] Calling tool: {}", name);
        let result = tool.execute(arguments, cancel).await;
        match &result {
            Ok(output) => log_debug!(self.logger, "[ToolRegistry] {} returned {} bytes", name, output.len()),
            Err(e) => log_warn!(self.logger, "[ToolRegistry] {} failed: {}", name, e),
        }
        result
    }

    /// Execute one model-requested call, converting every failure into data
    pub async fn execute_tool_call(&self, call: &ToolCallRequest, cancel: CancellationToken) -> ToolResult {
        let arguments = match ToolArguments::parse(&call.arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                log_warn!(
                    self.logger,
                    "[ToolRegistry] Unparsable arguments for {} ({}): {}",
                    call.name,
                    call.id,
                    e
                );
                return ToolResult::error(call, format!("could not parse arguments for {}: {}", call.name, e));
            }
        };

        match self.execute(&call.name, arguments, cancel).await {
            Ok(output) => ToolResult::success(call, output),
            Err(e) => ToolResult::error(call, e),
        }
    }

    /// Execute a batch of calls concurrently
    ///
    /// Returns exactly one result per call, in the order the calls were given.
    pub async fn execute_tool_calls(
        &self,
        calls: &[ToolCallRequest],
        cancel: CancellationToken,
    ) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.execute_tool_call(call, cancel.clone()))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::system::StaticSignals;
    use crate::tools::capability::ParameterSchema;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes its `text` argument after an optional delay and counts executions
    struct EchoTool {
        name: &'static str,
        delay: Duration,
        runs: Arc<AtomicUsize>,
    }

    impl EchoTool {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                delay: Duration::ZERO,
                runs: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[derive(serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct EchoArgs {
        text: String,
    }

    #[async_trait]
    impl ToolCapability for EchoTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echo the text argument"
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::empty()
        }

        async fn execute(&self, arguments: ToolArguments, _cancel: CancellationToken) -> ToolOutcome<String> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let args: EchoArgs = arguments.decode(self.name)?;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(args.text)
        }
    }

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    #[test]
    fn test_builtin_catalog() {
        let registry = ToolRegistry::with_builtin_tools(Arc::new(StaticSignals::new()), test_logger());
        assert_eq!(
            registry.names(),
            vec!["vpn_detector", "network_interfaces", "dns_lookup", "tcp_probe"]
        );
        for def in registry.definitions() {
            assert!(!def.description.is_empty());
            assert_eq!(def.input_schema["type"], "object");
        }
    }

    #[test]
    fn test_register_rejects_duplicates_and_bad_names() {
        let registry = ToolRegistry::new(test_logger());
        registry.register(Arc::new(EchoTool::new("echo"))).unwrap();

        assert_eq!(
            registry.register(Arc::new(EchoTool::new("echo"))),
            Err(RegistryError::Duplicate("echo".into()))
        );
        assert!(matches!(
            registry.register(Arc::new(EchoTool::new("Echo Tool"))),
            Err(RegistryError::InvalidName(_))
        ));
        assert_eq!(registry.tool_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_name_is_not_found_and_runs_nothing() {
        let registry = ToolRegistry::new(test_logger());
        let echo = EchoTool::new("echo");
        let runs = Arc::clone(&echo.runs);
        registry.register(Arc::new(echo)).unwrap();

        for name in ["missing", "", "ECHO", "echo "] {
            let err = registry
                .execute(name, ToolArguments::new(), CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(err, ToolError::NotFound(name.to_string()));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_execute_tool_call_converts_failures_to_results() {
        let registry = ToolRegistry::new(test_logger());
        registry.register(Arc::new(EchoTool::new("echo"))).unwrap();
        let cancel = CancellationToken::new();

        let ok = registry
            .execute_tool_call(&ToolCallRequest::new("1", "echo", r#"{"text":"hi"}"#), cancel.clone())
            .await;
        assert_eq!(ok.content, "hi");
        assert!(!ok.is_error);

        let bad_json = registry
            .execute_tool_call(&ToolCallRequest::new("2", "echo", "{text"), cancel.clone())
            .await;
        assert!(bad_json.is_error);
        assert!(bad_json.content.contains("could not parse arguments"));

        let bad_args = registry
            .execute_tool_call(&ToolCallRequest::new("3", "echo", r#"{"txt":"hi"}"#), cancel.clone())
            .await;
        assert!(bad_args.is_error);
        assert!(bad_args.content.contains("Invalid arguments for echo"));

        let missing = registry
            .execute_tool_call(&ToolCallRequest::new("4", "nope", "{}"), cancel)
            .await;
        assert!(missing.is_error);
        assert_eq!(missing.call_id, "4");
    }

    #[tokio::test]
    async fn test_batch_preserves_request_order() {
        let registry = ToolRegistry::new(test_logger());
        let mut slow = EchoTool::new("slow");
        slow.delay = Duration::from_millis(50);
        registry.register(Arc::new(slow)).unwrap();
        registry.register(Arc::new(EchoTool::new("fast"))).unwrap();

        let calls = vec![
            ToolCallRequest::new("a", "slow", r#"{"text":"first"}"#),
            ToolCallRequest::new("b", "fast", r#"{"text":"second"}"#),
            ToolCallRequest::new("c", "fast", "not json"),
        ];
        let results = registry.execute_tool_calls(&calls, CancellationToken::new()).await;

        let ids: Vec<_> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(results[0].content, "first");
        assert_eq!(results[1].content, "second");
        assert!(results[2].is_error);
    }
}
