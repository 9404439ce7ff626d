//! Request admission around the orchestrator

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::LimitsConfig;
use crate::logging::Logger;
use crate::orchestrator::{Orchestrator, OrchestratorError};
use crate::tools::ToolArguments;
use crate::types::{CancellationToken, ToolDefinition};
use crate::{log_info, log_warn};

use super::error::{FrontDoorError, FrontDoorResult};
use super::stats::ServiceStats;

const MAX_CONVERSATION_ID_LEN: usize = 128;

/// Answer returned to a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub tools_used: Vec<String>,
    pub conversation_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Output of a directly executed tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub tool: String,
    pub output: String,
}

/// Entry point shared by the HTTP server and the CLI
///
/// Validates input, bounds concurrency, applies the deadline and keeps the
/// service-wide counters. The orchestrator underneath stays stateless.
pub struct FrontDoor {
    orchestrator: Arc<Orchestrator>,
    limiter: Arc<Semaphore>,
    max_concurrent: usize,
    default_deadline: Duration,
    max_message_chars: usize,
    stats: Mutex<ServiceStats>,
    started_at: Instant,
    logger: Arc<dyn Logger>,
}

/// Keeps `in_flight` right even when the request future is dropped
struct InFlight<'a> {
    stats: &'a Mutex<ServiceStats>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut stats = self.stats.lock();
        stats.in_flight = stats.in_flight.saturating_sub(1);
    }
}

impl FrontDoor {
    pub fn new(orchestrator: Arc<Orchestrator>, limits: &LimitsConfig, logger: Arc<dyn Logger>) -> Self {
        let max_concurrent = limits.max_concurrent_requests.max(1);
        Self {
            orchestrator,
            limiter: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            default_deadline: Duration::from_secs(limits.timeout_secs.max(1)),
            max_message_chars: limits.max_message_chars,
            stats: Mutex::new(ServiceStats::default()),
            started_at: Instant::now(),
            logger,
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Catalog of available tools
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.orchestrator.registry().definitions()
    }

    /// Answer one question
    ///
    /// `deadline: None` uses the configured default. A missing
    /// `conversation_id` gets a fresh one; nothing is remembered between calls.
    pub async fn handle(
        &self,
        message: &str,
        tools_enabled: bool,
        deadline: Option<Duration>,
        conversation_id: Option<String>,
    ) -> FrontDoorResult<ChatReply> {
        let admitted = self
            .validate_chat(message, deadline, conversation_id.as_deref())
            .and_then(|_| self.admit());
        let _guard = match admitted {
            Ok(guard) => guard,
            Err(e) => {
                self.record_rejection(&e);
                return Err(e);
            }
        };

        let deadline = deadline.unwrap_or(self.default_deadline);
        let conversation_id = conversation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        log_info!(
            self.logger,
            "[FrontDoor] Conversation {} started (tools {})",
            conversation_id,
            if tools_enabled { "enabled" } else { "disabled" }
        );

        let result = self
            .orchestrator
            .run_with_deadline(message.trim(), tools_enabled, deadline)
            .await;

        let mut stats = self.stats.lock();
        match result {
            Ok(outcome) => {
                stats.requests_succeeded += 1;
                stats.tools_invoked += outcome.tools_used.len() as u64;
                drop(stats);
                Ok(ChatReply {
                    answer: outcome.answer,
                    tools_used: outcome.tools_used,
                    conversation_id,
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                stats.requests_failed += 1;
                if matches!(e, OrchestratorError::Timeout(_)) {
                    stats.timeouts += 1;
                }
                drop(stats);
                log_warn!(self.logger, "[FrontDoor] Conversation {} failed: {}", conversation_id, e);
                Err(e.into())
            }
        }
    }

    /// Run one tool directly, outside any conversation
    ///
    /// An unknown name is `ToolNotFound` here, not a recovered result.
    pub async fn execute_tool(&self, name: &str, arguments: Value) -> FrontDoorResult<ToolOutput> {
        let arguments = ToolArguments::from_value(arguments).map_err(|e| FrontDoorError::InvalidInput(e.to_string()));
        let admitted = arguments.and_then(|args| self.admit().map(|guard| (args, guard)));
        let (arguments, _guard) = match admitted {
            Ok(admitted) => admitted,
            Err(e) => {
                self.record_rejection(&e);
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let registry = self.orchestrator.registry();
        let result = match tokio::time::timeout(
            self.default_deadline,
            registry.execute(name, arguments, cancel.clone()),
        )
        .await
        {
            Ok(result) => result.map_err(FrontDoorError::from),
            Err(_) => {
                cancel.cancel();
                Err(OrchestratorError::Timeout(self.default_deadline).into())
            }
        };

        let mut stats = self.stats.lock();
        match &result {
            Ok(_) => {
                stats.requests_succeeded += 1;
                stats.tools_invoked += 1;
            }
            Err(FrontDoorError::Orchestrator(OrchestratorError::Timeout(_))) => {
                stats.requests_failed += 1;
                stats.timeouts += 1;
            }
            Err(_) => stats.requests_failed += 1,
        }
        drop(stats);

        result.map(|output| ToolOutput {
            tool: name.to_string(),
            output,
        })
    }

    fn validate_chat(
        &self,
        message: &str,
        deadline: Option<Duration>,
        conversation_id: Option<&str>,
    ) -> FrontDoorResult<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(FrontDoorError::InvalidInput("message must not be empty".into()));
        }
        let chars = message.chars().count();
        if chars > self.max_message_chars {
            return Err(FrontDoorError::InvalidInput(format!(
                "message is {} characters, the limit is {}",
                chars, self.max_message_chars
            )));
        }
        if deadline.is_some_and(|d| d.is_zero()) {
            return Err(FrontDoorError::InvalidInput("deadline must be greater than zero".into()));
        }
        if let Some(id) = conversation_id {
            if id.trim().is_empty() || id.len() > MAX_CONVERSATION_ID_LEN {
                return Err(FrontDoorError::InvalidInput(format!(
                    "conversation_id must be 1-{} characters",
                    MAX_CONVERSATION_ID_LEN
                )));
            }
        }
        Ok(())
    }

    /// Take a request slot without waiting
    fn admit(&self) -> FrontDoorResult<InFlight<'_>> {
        let permit = Arc::clone(&self.limiter)
            .try_acquire_owned()
            .map_err(|_| FrontDoorError::Busy(self.max_concurrent))?;
        let mut stats = self.stats.lock();
        stats.requests_total += 1;
        stats.in_flight += 1;
        Ok(InFlight {
            stats: &self.stats,
            _permit: permit,
        })
    }

    fn record_rejection(&self, e: &FrontDoorError) {
        log_warn!(self.logger, "[FrontDoor] Rejected request: {}", e);
        let mut stats = self.stats.lock();
        stats.requests_total += 1;
        stats.requests_rejected += 1;
    }
}
