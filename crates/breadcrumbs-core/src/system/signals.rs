//! Operating-system signals consumed by the diagnostic tools

use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading a signal source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The source exists but the process lacks the privilege to read it
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The source is not present on this machine (tool not installed, wrong OS)
    #[error("signal source unavailable: {0}")]
    Unavailable(String),

    /// The source was read but produced something unusable
    #[error("signal read failed: {0}")]
    Failed(String),

    /// The read was cancelled before it finished
    #[error("signal read cancelled")]
    Cancelled,
}

pub type SignalResult<T> = Result<T, SignalError>;

/// One network interface as observed at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    pub name: String,
    /// Administrative UP flag
    pub is_up: bool,
    pub addresses: Vec<IpAddr>,
}

impl InterfaceSnapshot {
    pub fn new(name: impl Into<String>, is_up: bool, addresses: Vec<IpAddr>) -> Self {
        Self {
            name: name.into(),
            is_up,
            addresses,
        }
    }

    /// Addresses that count as assigned
    ///
    /// Link-local IPv6 and unspecified addresses are excluded: tunnel
    /// interfaces routinely carry an `fe80::` address while no tunnel is up.
    pub fn assigned_addresses(&self) -> impl Iterator<Item = &IpAddr> + '_ {
        self.addresses.iter().filter(|addr| is_assigned(addr))
    }

    /// First assigned address, IPv4 preferred
    pub fn primary_address(&self) -> Option<IpAddr> {
        self.assigned_addresses()
            .find(|a| a.is_ipv4())
            .or_else(|| self.assigned_addresses().next())
            .copied()
    }

    /// Up and carrying at least one assigned address
    pub fn is_active(&self) -> bool {
        self.is_up && self.primary_address().is_some()
    }
}

fn is_assigned(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => !v4.is_unspecified() && !v4.is_link_local(),
        IpAddr::V6(v6) => !v6.is_unspecified() && (v6.segments()[0] & 0xffc0) != 0xfe80,
    }
}

/// Connection state reported by a managed VPN service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Connected,
    Connecting,
    Disconnecting,
    Disconnected,
    Invalid,
}

impl ServiceState {
    /// Between connected and disconnected
    pub fn is_transitional(&self) -> bool {
        matches!(self, ServiceState::Connecting | ServiceState::Disconnecting)
    }
}

/// Descriptive data about a configured VPN profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpnProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(rename = "serverAddress", skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
    #[serde(rename = "hasCertificate", skip_serializing_if = "Option::is_none")]
    pub has_certificate: Option<bool>,
}

impl VpnProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Status of one VPN profile as reported by a service or configuration store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub state: ServiceState,
    /// Interface the service says it is using, when it says
    pub interface: Option<String>,
    pub profile: VpnProfile,
}

impl ServiceStatus {
    pub fn new(state: ServiceState, interface: Option<String>, profile: VpnProfile) -> Self {
        Self {
            state,
            interface,
            profile,
        }
    }
}

/// Source of the OS state the network tools reason about
///
/// Each method is an independent observation; none of them cross-checks
/// another. `HostSignals` reads the live machine, `StaticSignals` replays a
/// fixed snapshot.
#[async_trait]
pub trait SystemSignals: Send + Sync {
    /// Status of the single-profile managed VPN service, `None` if no VPN
    /// profile is active or known to the service
    async fn vpn_service_status(&self) -> SignalResult<Option<ServiceStatus>>;

    /// Status of every tunnel managed by a multi-profile tunnel provider
    async fn tunnel_provider_statuses(&self) -> SignalResult<Vec<ServiceStatus>>;

    /// All network interfaces with their addresses
    async fn interfaces(&self) -> SignalResult<Vec<InterfaceSnapshot>>;

    /// VPN services from the system network configuration store
    async fn network_service_configuration(&self) -> SignalResult<Vec<ServiceStatus>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_link_local_is_not_assigned() {
        let utun = InterfaceSnapshot::new("utun0", true, vec![ip("fe80::1")]);
        assert!(!utun.is_active());
        assert_eq!(utun.primary_address(), None);
    }

    #[test]
    fn test_ipv4_preferred_as_primary() {
        let tun = InterfaceSnapshot::new("tun0", true, vec![ip("fd00::2"), ip("10.8.0.2")]);
        assert_eq!(tun.primary_address(), Some(ip("10.8.0.2")));
        assert!(tun.is_active());
    }

    #[test]
    fn test_down_interface_is_not_active() {
        let tun = InterfaceSnapshot::new("tun0", false, vec![ip("10.8.0.2")]);
        assert!(!tun.is_active());
    }
}
