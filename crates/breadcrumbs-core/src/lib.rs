//! Breadcrumbs Core
//!
//! Tool-augmented diagnostic conversations about the local machine.
//! This crate holds everything except the transport: the HTTP server and the
//! CLI in `breadcrumbs-server` are thin layers over [`FrontDoor`].
//!
//! ## Conversation flow
//!
//! One question runs at most two model rounds:
//! - round 1 sees the question and the tool catalog
//! - any requested tools run in parallel through the [`ToolRegistry`]
//! - round 2 sees the tool results and produces the answer
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use breadcrumbs_core::{
//!     build_front_door, ConsoleLogger, EnvSecretStore, HostSignals, ServiceConfig,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::load(None)?;
//! let logger: Arc<dyn breadcrumbs_core::Logger> = Arc::new(ConsoleLogger::new());
//! let door = build_front_door(
//!     &config,
//!     Arc::new(HostSignals::new(logger.clone())),
//!     Arc::new(EnvSecretStore::new()),
//!     logger,
//! )?;
//!
//! let reply = door.handle("Is my VPN connected?", true, None, None).await?;
//! println!("{} (tools: {:?})", reply.answer, reply.tools_used);
//! # Ok(())
//! # }
//! ```

pub mod types;
pub mod logging;
pub mod secrets;
pub mod config;
pub mod system;
pub mod tools;
pub mod adapter;
pub mod orchestrator;
pub mod service;

// Re-export commonly used types
pub use types::{CancellationToken, ChatMessage, MessageRole, ToolCallRequest, ToolDefinition, ToolResult};

pub use logging::{ConsoleLogger, LogLevel, Logger, NoOpLogger};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore, SecretStoreError, SecretStoreResult};

pub use config::{ConfigError, ConfigFile, ConfigResult, LimitsConfig, ServerConfig, ServiceConfig};

pub use system::{HostSignals, InterfaceSnapshot, ServiceStatus, SignalError, StaticSignals, SystemSignals};

pub use tools::{ToolArguments, ToolCapability, ToolError, ToolRegistry, VpnDetectionResult, VpnDetector};

pub use adapter::{create_adapter, AdapterError, MockAdapter, ModelAdapter, ModelSettings};

pub use orchestrator::{ConversationOutcome, Orchestrator, OrchestratorError};

pub use service::{build_front_door, ChatReply, FrontDoor, FrontDoorError, ServiceStats, ToolOutput};
