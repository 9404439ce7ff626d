//! The four detection strategies
//!
//! Each strategy turns one raw signal into [`Evidence`] and nothing else.
//! None of them looks at another signal; corroboration happens in the
//! detector's reconciliation step.

use serde::Serialize;

use crate::system::{InterfaceSnapshot, ServiceState, ServiceStatus, SignalError, SignalResult, VpnProfile};

/// Interface name prefixes used by common VPN clients
pub const VPN_INTERFACE_PREFIXES: &[&str] = &[
    "utun", "tun", "tap", "ppp", "ipsec", "wg", "gpd", "cscotun", "nordlynx", "tailscale", "zt",
    "proton",
];

/// Whether an interface name looks like a VPN tunnel
pub fn is_vpn_interface(name: &str) -> bool {
    VPN_INTERFACE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Which strategy produced a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ManagedService,
    TunnelProvider,
    InterfaceScan,
    ServiceConfiguration,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ManagedService => "managed_service",
            Strategy::TunnelProvider => "tunnel_provider",
            Strategy::InterfaceScan => "interface_scan",
            Strategy::ServiceConfiguration => "service_configuration",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provisional "connected" claim awaiting corroboration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Interfaces the source says carry the tunnel; empty when it does not say
    pub candidates: Vec<String>,
    pub profile: Option<VpnProfile>,
}

impl Claim {
    fn from_status(status: &ServiceStatus) -> Self {
        Self {
            candidates: status.interface.iter().cloned().collect(),
            profile: Some(status.profile.clone()),
        }
    }

    /// Human-readable subject for log lines and discrepancy notes
    pub fn label(&self) -> String {
        self.profile
            .as_ref()
            .and_then(|p| p.name.clone().or_else(|| p.identifier.clone()))
            .or_else(|| self.candidates.first().cloned())
            .unwrap_or_else(|| "unnamed VPN".to_string())
    }
}

/// What one strategy observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    /// The source was readable and shows no VPN
    NoEvidence,
    /// The source claims one or more tunnels are connected
    Connected(Vec<Claim>),
    /// The source shows a VPN in a state that rules out "connected"
    Contradicted(String),
    /// The source could not be read
    Unavailable(SignalError),
}

impl Evidence {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Evidence::Unavailable(_))
    }
}

/// Strategy 1: the single-profile managed VPN service
pub fn managed_service(status: SignalResult<Option<ServiceStatus>>) -> Evidence {
    match status {
        Err(e) => Evidence::Unavailable(e),
        Ok(None) => Evidence::NoEvidence,
        Ok(Some(status)) => from_service_states(std::slice::from_ref(&status)),
    }
}

/// Strategy 2: the multi-profile tunnel provider
pub fn tunnel_provider(statuses: SignalResult<Vec<ServiceStatus>>) -> Evidence {
    match statuses {
        Err(e) => Evidence::Unavailable(e),
        Ok(statuses) => from_service_states(&statuses),
    }
}

/// Strategy 3: interfaces whose names match a VPN prefix
///
/// Only interfaces that are up with an assigned address become claims; a
/// matching interface without one is a contradiction, not evidence.
pub fn interface_scan(interfaces: &SignalResult<Vec<InterfaceSnapshot>>) -> Evidence {
    let interfaces = match interfaces {
        Ok(interfaces) => interfaces,
        Err(e) => return Evidence::Unavailable(e.clone()),
    };

    let (active, idle): (Vec<&InterfaceSnapshot>, Vec<&InterfaceSnapshot>) = interfaces
        .iter()
        .filter(|iface| is_vpn_interface(&iface.name))
        .partition(|iface| iface.is_active());

    if !active.is_empty() {
        return Evidence::Connected(
            active
                .into_iter()
                .map(|iface| Claim {
                    candidates: vec![iface.name.clone()],
                    profile: None,
                })
                .collect(),
        );
    }

    match idle.as_slice() {
        [] => Evidence::NoEvidence,
        idle => {
            let names: Vec<&str> = idle.iter().map(|iface| iface.name.as_str()).collect();
            Evidence::Contradicted(format!(
                "tunnel interface {} present without an assigned address",
                names.join(", ")
            ))
        }
    }
}

/// Strategy 4: VPN services in the network configuration store
pub fn service_configuration(services: SignalResult<Vec<ServiceStatus>>) -> Evidence {
    match services {
        Err(e) => Evidence::Unavailable(e),
        Ok(services) => from_service_states(&services),
    }
}

fn from_service_states(statuses: &[ServiceStatus]) -> Evidence {
    let claims: Vec<Claim> = statuses
        .iter()
        .filter(|s| s.state == ServiceState::Connected)
        .map(Claim::from_status)
        .collect();
    if !claims.is_empty() {
        return Evidence::Connected(claims);
    }

    statuses
        .iter()
        .find(|s| s.state.is_transitional())
        .map(|s| {
            Evidence::Contradicted(format!(
                "{} is {:?}",
                Claim::from_status(s).label(),
                s.state
            ))
        })
        .unwrap_or(Evidence::NoEvidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, up: bool, addrs: &[&str]) -> InterfaceSnapshot {
        InterfaceSnapshot::new(name, up, addrs.iter().map(|a| a.parse().unwrap()).collect())
    }

    #[test]
    fn test_prefix_matching() {
        for name in ["utun3", "tun0", "wg0", "ppp0", "nordlynx", "tailscale0", "ztabcdef", "proton0"] {
            assert!(is_vpn_interface(name), "{name}");
        }
        for name in ["en0", "eth0", "lo", "docker0", "wlan0"] {
            assert!(!is_vpn_interface(name), "{name}");
        }
    }

    #[test]
    fn test_managed_service_states() {
        assert_eq!(managed_service(Ok(None)), Evidence::NoEvidence);

        let connected = ServiceStatus::new(ServiceState::Connected, Some("tun0".into()), VpnProfile::named("Work"));
        match managed_service(Ok(Some(connected))) {
            Evidence::Connected(claims) => {
                assert_eq!(claims[0].candidates, vec!["tun0"]);
                assert_eq!(claims[0].label(), "Work");
            }
            other => panic!("unexpected {other:?}"),
        }

        let connecting = ServiceStatus::new(ServiceState::Connecting, None, VpnProfile::named("Work"));
        assert!(matches!(managed_service(Ok(Some(connecting))), Evidence::Contradicted(_)));

        let denied = managed_service(Err(SignalError::PermissionDenied("nmcli".into())));
        assert!(denied.is_unavailable());
    }

    #[test]
    fn test_interface_scan_requires_assigned_address() {
        let only_link_local = Ok(vec![iface("utun2", true, &["fe80::1"]), iface("en0", true, &["192.168.1.4"])]);
        assert!(matches!(interface_scan(&only_link_local), Evidence::Contradicted(_)));

        let assigned = Ok(vec![iface("en0", true, &["192.168.1.4"]), iface("utun4", true, &["10.0.0.7"])]);
        match interface_scan(&assigned) {
            Evidence::Connected(claims) => assert_eq!(claims[0].candidates, vec!["utun4"]),
            other => panic!("unexpected {other:?}"),
        }

        let none = Ok(vec![iface("en0", true, &["192.168.1.4"])]);
        assert_eq!(interface_scan(&none), Evidence::NoEvidence);
    }

    #[test]
    fn test_tunnel_provider_collects_every_connected_tunnel() {
        let statuses = vec![
            ServiceStatus::new(ServiceState::Disconnected, Some("wg1".into()), VpnProfile::named("wg1")),
            ServiceStatus::new(ServiceState::Connected, Some("wg0".into()), VpnProfile::named("wg0")),
            ServiceStatus::new(ServiceState::Connected, Some("wg2".into()), VpnProfile::named("wg2")),
        ];
        match tunnel_provider(Ok(statuses)) {
            Evidence::Connected(claims) => assert_eq!(claims.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
