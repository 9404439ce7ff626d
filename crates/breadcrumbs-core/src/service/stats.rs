//! Cross-request counters

use serde::Serialize;

/// Counters shared by every request the front door handles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub requests_total: u64,
    pub requests_succeeded: u64,
    pub requests_failed: u64,
    /// Turned away by validation or the concurrency limit
    pub requests_rejected: u64,
    pub timeouts: u64,
    /// Tool names requested by the model, summed over all conversations
    pub tools_invoked: u64,
    pub in_flight: u64,
}
