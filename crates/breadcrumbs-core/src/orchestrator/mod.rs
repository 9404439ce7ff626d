//! Tool-augmented conversation orchestration
//!
//! One run is at most two model rounds:
//!
//! ```text
//! AWAIT_MODEL_1 ── no tool calls ──────────────────────────────▶ DONE
//!       │
//!       └── tool calls ─▶ EXECUTE_TOOLS ─▶ AWAIT_MODEL_2 (no catalog) ─▶ DONE
//! ```

mod engine;
mod error;
mod history;

pub use engine::{ConversationOutcome, Orchestrator, SYSTEM_INSTRUCTION};
pub use error::{OrchestratorError, OrchestratorResult};
pub use history::{History, OrphanedResult};
