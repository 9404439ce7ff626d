//! TCP reachability probe

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;

use crate::types::CancellationToken;

use super::arguments::ToolArguments;
use super::capability::{ParameterKind, ParameterSchema, ParameterSpec, ToolCapability, ToolError, ToolOutcome};
use super::dns::validate_host;

pub const TCP_PROBE_TOOL: &str = "tcp_probe";

const DEFAULT_TIMEOUT_MS: u64 = 3000;
const MAX_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    host: String,
    port: u16,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Attempts a TCP connection and reports whether it succeeded
///
/// A refused or timed-out connection is a normal result (`reachable: false`),
/// not a tool failure.
#[derive(Debug, Default)]
pub struct TcpProbeTool;

impl TcpProbeTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolCapability for TcpProbeTool {
    fn name(&self) -> &str {
        TCP_PROBE_TOOL
    }

    fn description(&self) -> &str {
        "Try to open a TCP connection to host:port and report whether it is reachable and how \
         long the connection took. Use it to check whether a service or port is reachable from \
         this machine."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::empty()
            .with(ParameterSpec::required("host", ParameterKind::String, "Hostname or IP address"))
            .with(ParameterSpec::required("port", ParameterKind::Integer, "TCP port, 1-65535"))
            .with(ParameterSpec::optional(
                "timeout_ms",
                ParameterKind::Integer,
                "Connect timeout in milliseconds, 1-10000 (default 3000)",
            ))
    }

    async fn execute(&self, arguments: ToolArguments, cancel: CancellationToken) -> ToolOutcome<String> {
        let args: Args = arguments.decode(TCP_PROBE_TOOL)?;
        let host = args.host.trim();
        validate_host(TCP_PROBE_TOOL, host)?;
        if args.port == 0 {
            return Err(ToolError::invalid_arguments(TCP_PROBE_TOOL, "port must be between 1 and 65535"));
        }
        let timeout_ms = args.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 || timeout_ms > MAX_TIMEOUT_MS {
            return Err(ToolError::invalid_arguments(
                TCP_PROBE_TOOL,
                format!("timeout_ms must be between 1 and {}", MAX_TIMEOUT_MS),
            ));
        }

        let started = Instant::now();
        let attempt = tokio::time::timeout(Duration::from_millis(timeout_ms), TcpStream::connect((host, args.port)));
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ToolError::execution_failed(TCP_PROBE_TOOL, "cancelled")),
            outcome = attempt => outcome,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let report = match outcome {
            Ok(Ok(stream)) => json!({
                "host": host,
                "port": args.port,
                "reachable": true,
                "latencyMs": elapsed_ms,
                "remoteAddress": stream.peer_addr().ok().map(|a| a.ip().to_string()),
            }),
            Ok(Err(e)) => json!({
                "host": host,
                "port": args.port,
                "reachable": false,
                "error": e.to_string(),
            }),
            Err(_) => json!({
                "host": host,
                "port": args.port,
                "reachable": false,
                "error": format!("no response within {}ms", timeout_ms),
            }),
        };

        serde_json::to_string_pretty(&report).map_err(|e| ToolError::execution_failed(TCP_PROBE_TOOL, e.to_string()))
    }
}
