//! Network interface listing

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::system::{InterfaceSnapshot, SystemSignals};
use crate::types::CancellationToken;

use super::arguments::ToolArguments;
use super::capability::{ParameterKind, ParameterSchema, ParameterSpec, ToolCapability, ToolError, ToolOutcome};
use super::vpn::is_vpn_interface;

pub const NETWORK_INTERFACES_TOOL: &str = "network_interfaces";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Scope {
    #[default]
    All,
    Active,
    Vpn,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    #[serde(default)]
    scope: Scope,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InterfaceEntry<'a> {
    name: &'a str,
    is_up: bool,
    is_vpn: bool,
    addresses: &'a [IpAddr],
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_address: Option<IpAddr>,
}

impl<'a> From<&'a InterfaceSnapshot> for InterfaceEntry<'a> {
    fn from(iface: &'a InterfaceSnapshot) -> Self {
        Self {
            name: &iface.name,
            is_up: iface.is_up,
            is_vpn: is_vpn_interface(&iface.name),
            addresses: &iface.addresses,
            primary_address: iface.primary_address(),
        }
    }
}

/// Lists interfaces with their up-state and addresses
pub struct NetworkInterfacesTool {
    signals: Arc<dyn SystemSignals>,
}

impl NetworkInterfacesTool {
    pub fn new(signals: Arc<dyn SystemSignals>) -> Self {
        Self { signals }
    }
}

#[async_trait]
impl ToolCapability for NetworkInterfacesTool {
    fn name(&self) -> &str {
        NETWORK_INTERFACES_TOOL
    }

    fn description(&self) -> &str {
        "List the machine's network interfaces with their up/down state and IP addresses. \
         Use scope \"active\" for interfaces that are up with an assigned address, or \"vpn\" \
         for tunnel interfaces only."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::empty().with(ParameterSpec::optional(
            "scope",
            ParameterKind::Enum(vec!["all".into(), "active".into(), "vpn".into()]),
            "Which interfaces to include (default \"all\")",
        ))
    }

    async fn execute(&self, arguments: ToolArguments, cancel: CancellationToken) -> ToolOutcome<String> {
        let args: Args = arguments.decode(NETWORK_INTERFACES_TOOL)?;

        let interfaces = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ToolError::execution_failed(NETWORK_INTERFACES_TOOL, "cancelled"));
            }
            result = self.signals.interfaces() => result
                .map_err(|e| ToolError::execution_failed(NETWORK_INTERFACES_TOOL, e.to_string()))?,
        };

        let entries: Vec<InterfaceEntry<'_>> = interfaces
            .iter()
            .filter(|iface| match args.scope {
                Scope::All => true,
                Scope::Active => iface.is_active(),
                Scope::Vpn => is_vpn_interface(&iface.name),
            })
            .map(InterfaceEntry::from)
            .collect();

        serde_json::to_string_pretty(&serde_json::json!({ "interfaces": entries }))
            .map_err(|e| ToolError::execution_failed(NETWORK_INTERFACES_TOOL, e.to_string()))
    }
}
