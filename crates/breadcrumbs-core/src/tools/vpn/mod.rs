//! VPN connectivity detection
//!
//! Four strategies read overlapping OS signals:
//!
//! 1. the managed single-profile VPN service
//! 2. the multi-profile tunnel provider
//! 3. interfaces with a known VPN name prefix
//! 4. the network service configuration (only when 1 and 2 are unreadable)
//!
//! A "connected" claim counts only when an interface it names (or, failing
//! that, any VPN-prefixed interface) is up with an assigned address. Claims
//! that fail this check are downgraded and recorded as discrepancies.

mod detector;
mod strategies;

use std::sync::Arc;

use async_trait::async_trait;

use crate::logging::Logger;
use crate::system::{SignalError, SystemSignals};
use crate::types::CancellationToken;

use super::arguments::{NoArguments, ToolArguments};
use super::capability::{ParameterSchema, ToolCapability, ToolError, ToolOutcome};

pub use detector::{Discrepancy, VpnDetectionResult, VpnDetector};
pub use strategies::{is_vpn_interface, Claim, Evidence, Strategy, VPN_INTERFACE_PREFIXES};

pub const VPN_DETECTOR_TOOL: &str = "vpn_detector";

/// Exposes [`VpnDetector`] as a tool
pub struct VpnDetectorTool {
    detector: VpnDetector,
}

impl VpnDetectorTool {
    pub fn new(signals: Arc<dyn SystemSignals>, logger: Arc<dyn Logger>) -> Self {
        Self {
            detector: VpnDetector::new(signals, logger),
        }
    }
}

#[async_trait]
impl ToolCapability for VpnDetectorTool {
    fn name(&self) -> &str {
        VPN_DETECTOR_TOOL
    }

    fn description(&self) -> &str {
        "Check whether this machine is currently connected to a VPN. Returns connected \
         (true/false) and, when connected, the detection method, tunnel interface, assigned \
         address and VPN profile details."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::empty()
    }

    async fn execute(&self, arguments: ToolArguments, cancel: CancellationToken) -> ToolOutcome<String> {
        let NoArguments {} = arguments.decode(VPN_DETECTOR_TOOL)?;

        let result = self.detector.detect(cancel).await.map_err(|e| match e {
            SignalError::Cancelled => ToolError::execution_failed(VPN_DETECTOR_TOOL, "detection cancelled"),
            other => ToolError::execution_failed(VPN_DETECTOR_TOOL, other.to_string()),
        })?;

        serde_json::to_string_pretty(&result)
            .map_err(|e| ToolError::execution_failed(VPN_DETECTOR_TOOL, e.to_string()))
    }
}
