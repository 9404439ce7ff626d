//! Front door error types

use thiserror::Error;

use crate::orchestrator::OrchestratorError;
use crate::tools::ToolError;

/// Everything a caller of the front door can get instead of an answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontDoorError {
    /// Rejected before any work started
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// All request slots are taken
    #[error("service is at capacity ({0} requests in flight), try again later")]
    Busy(usize),

    /// Direct execution of a tool that is not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Direct execution of a tool that failed
    #[error(transparent)]
    Tool(ToolError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

impl From<ToolError> for FrontDoorError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::NotFound(name) => FrontDoorError::ToolNotFound(name),
            other => FrontDoorError::Tool(other),
        }
    }
}

impl FrontDoorError {
    /// Stable tag for this kind of failure
    pub fn kind(&self) -> &'static str {
        match self {
            FrontDoorError::InvalidInput(_) => "invalid_input",
            FrontDoorError::Busy(_) => "busy",
            FrontDoorError::ToolNotFound(_) => "tool_not_found",
            FrontDoorError::Tool(e) => e.kind(),
            FrontDoorError::Orchestrator(e) => e.kind(),
        }
    }
}

pub type FrontDoorResult<T> = Result<T, FrontDoorError>;
