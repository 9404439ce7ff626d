//! Core types shared by the orchestrator, adapters and tools

mod message;
mod tool;
mod cancellation;

pub use message::{ChatMessage, MessageRole};
pub use tool::{ToolCallRequest, ToolDefinition, ToolResult};
pub use cancellation::CancellationToken;
