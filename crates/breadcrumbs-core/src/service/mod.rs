//! The front door: admission, limits and counters around the orchestrator
//!
//! ```text
//! HTTP handler / CLI
//!        │
//!        ▼
//!   FrontDoor ── validate ── try_acquire permit ── deadline
//!        │
//!        ▼
//!   Orchestrator ── ModelAdapter
//!        │
//!        └──────── ToolRegistry ── SystemSignals
//! ```

mod error;
mod front_door;
mod stats;

pub use error::{FrontDoorError, FrontDoorResult};
pub use front_door::{ChatReply, FrontDoor, ToolOutput};
pub use stats::ServiceStats;

use std::sync::Arc;

use crate::adapter::{create_adapter, AdapterResult};
use crate::config::ServiceConfig;
use crate::log_info;
use crate::logging::Logger;
use crate::orchestrator::Orchestrator;
use crate::secrets::SecretStore;
use crate::system::SystemSignals;
use crate::tools::ToolRegistry;

/// Wire registry, adapter, orchestrator and front door from configuration
pub fn build_front_door(
    config: &ServiceConfig,
    signals: Arc<dyn SystemSignals>,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
) -> AdapterResult<FrontDoor> {
    let registry = Arc::new(ToolRegistry::with_builtin_tools(signals, Arc::clone(&logger)));
    let adapter = create_adapter(&config.model, secrets, Arc::clone(&logger))?;
    log_info!(
        logger,
        "[FrontDoor] Using {} model {} with {} tools",
        adapter.name(),
        adapter.model(),
        registry.tool_count()
    );

    let mut orchestrator = Orchestrator::new(registry, adapter, Arc::clone(&logger));
    if let Some(prompt) = &config.system_prompt {
        orchestrator = orchestrator.with_system_prompt(prompt.clone());
    }
    Ok(FrontDoor::new(Arc::new(orchestrator), &config.limits, logger))
}
