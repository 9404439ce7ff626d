//! Strategy chain and reconciliation

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::logging::Logger;
use crate::system::{InterfaceSnapshot, SignalError, SignalResult, SystemSignals, VpnProfile};
use crate::types::CancellationToken;
use crate::{log_debug, log_info};

use super::strategies::{self, is_vpn_interface, Claim, Evidence, Strategy};

/// A recorded disagreement between a strategy and the interface evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub strategy: Strategy,
    pub note: String,
}

/// Outcome of one detection run
///
/// Detail fields are populated only when `connected` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VpnDetectionResult {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<VpnProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discrepancies: Vec<Discrepancy>,
    pub checked_at: DateTime<Utc>,
}

impl VpnDetectionResult {
    fn not_connected(discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            connected: false,
            method: None,
            interface: None,
            address: None,
            profile: None,
            discrepancies,
            checked_at: Utc::now(),
        }
    }

    fn connected(method: Strategy, hit: Corroborated, discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            connected: true,
            method: Some(method),
            interface: Some(hit.interface),
            address: Some(hit.address),
            profile: hit.profile,
            discrepancies,
            checked_at: Utc::now(),
        }
    }
}

/// A claim confirmed by an active interface
struct Corroborated {
    interface: String,
    address: IpAddr,
    profile: Option<VpnProfile>,
}

/// Find the interface that backs a claim
///
/// A claim naming candidate interfaces is backed only by one of those; a
/// claim naming none is backed by any active VPN-prefixed interface.
fn corroborate(claim: &Claim, interfaces: &[InterfaceSnapshot]) -> Option<Corroborated> {
    interfaces
        .iter()
        .filter(|iface| {
            if claim.candidates.is_empty() {
                is_vpn_interface(&iface.name)
            } else {
                claim.candidates.iter().any(|c| c == &iface.name)
            }
        })
        .find_map(|iface| {
            if !iface.is_up {
                return None;
            }
            iface.primary_address().map(|address| Corroborated {
                interface: iface.name.clone(),
                address,
                profile: claim.profile.clone(),
            })
        })
}

/// Resolves "is this machine on a VPN" from the host's signals
pub struct VpnDetector {
    signals: Arc<dyn SystemSignals>,
    logger: Arc<dyn Logger>,
}

impl VpnDetector {
    pub fn new(signals: Arc<dyn SystemSignals>, logger: Arc<dyn Logger>) -> Self {
        Self { signals, logger }
    }

    /// Run the strategy chain
    ///
    /// Fails only when cancelled; unreadable sources are part of the answer.
    pub async fn detect(&self, cancel: CancellationToken) -> SignalResult<VpnDetectionResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SignalError::Cancelled),
            result = self.run_chain() => Ok(result),
        }
    }

    async fn run_chain(&self) -> VpnDetectionResult {
        let (service, tunnels, interfaces) = tokio::join!(
            self.signals.vpn_service_status(),
            self.signals.tunnel_provider_statuses(),
            self.signals.interfaces(),
        );
        let mut discrepancies = Vec::new();

        let service = strategies::managed_service(service);
        if let Some(hit) = self.reconcile(Strategy::ManagedService, &service, &interfaces, &mut discrepancies) {
            return VpnDetectionResult::connected(Strategy::ManagedService, hit, discrepancies);
        }

        let tunnels = strategies::tunnel_provider(tunnels);
        if let Some(hit) = self.reconcile(Strategy::TunnelProvider, &tunnels, &interfaces, &mut discrepancies) {
            return VpnDetectionResult::connected(Strategy::TunnelProvider, hit, discrepancies);
        }

        let scan = strategies::interface_scan(&interfaces);
        if let Some(hit) = self.reconcile(Strategy::InterfaceScan, &scan, &interfaces, &mut discrepancies) {
            return VpnDetectionResult::connected(Strategy::InterfaceScan, hit, discrepancies);
        }

        if service.is_unavailable() && tunnels.is_unavailable() {
            let configured = strategies::service_configuration(self.signals.network_service_configuration().await);
            if let Some(hit) =
                self.reconcile(Strategy::ServiceConfiguration, &configured, &interfaces, &mut discrepancies)
            {
                return VpnDetectionResult::connected(Strategy::ServiceConfiguration, hit, discrepancies);
            }
        }

        log_info!(self.logger, "[VpnDetector] No corroborated VPN connection found");
        VpnDetectionResult::not_connected(discrepancies)
    }

    /// Apply the corroboration rule to one strategy's evidence
    ///
    /// Claims that fail corroboration and contradictions are recorded as
    /// discrepancies; unreadable sources are only logged.
    fn reconcile(
        &self,
        strategy: Strategy,
        evidence: &Evidence,
        interfaces: &SignalResult<Vec<InterfaceSnapshot>>,
        discrepancies: &mut Vec<Discrepancy>,
    ) -> Option<Corroborated> {
        match evidence {
            Evidence::NoEvidence => {
                log_debug!(self.logger, "[VpnDetector] {}: no evidence", strategy);
                None
            }
            Evidence::Unavailable(reason) => {
                log_debug!(self.logger, "[VpnDetector] {}: unavailable ({})", strategy, reason);
                None
            }
            Evidence::Contradicted(note) => {
                log_debug!(self.logger, "[VpnDetector] {}: {}", strategy, note);
                discrepancies.push(Discrepancy {
                    strategy,
                    note: note.clone(),
                });
                None
            }
            Evidence::Connected(claims) => {
                let interfaces = match interfaces {
                    Ok(interfaces) => interfaces,
                    Err(e) => {
                        discrepancies.push(Discrepancy {
                            strategy,
                            note: format!("reports connected but interfaces could not be read: {}", e),
                        });
                        return None;
                    }
                };

                if let Some(hit) = claims.iter().find_map(|claim| corroborate(claim, interfaces)) {
                    log_info!(
                        self.logger,
                        "[VpnDetector] {}: connected via {} ({})",
                        strategy,
                        hit.interface,
                        hit.address
                    );
                    return Some(hit);
                }

                for claim in claims {
                    let note = if claim.candidates.is_empty() {
                        format!(
                            "{} reports connected but no VPN interface has an assigned address",
                            claim.label()
                        )
                    } else {
                        format!(
                            "{} reports connected but {} has no assigned address",
                            claim.label(),
                            claim.candidates.join(", ")
                        )
                    };
                    log_info!(self.logger, "[VpnDetector] {}: {}", strategy, note);
                    discrepancies.push(Discrepancy { strategy, note });
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::system::parse::{parse_nmcli_connections, VpnData};
    use crate::system::{ServiceState, ServiceStatus, StaticSignals};

    fn iface(name: &str, up: bool, addrs: &[&str]) -> InterfaceSnapshot {
        InterfaceSnapshot::new(name, up, addrs.iter().map(|a| a.parse().unwrap()).collect())
    }

    fn detector(signals: StaticSignals) -> VpnDetector {
        VpnDetector::new(Arc::new(signals), Arc::new(NoOpLogger::new()))
    }

    fn work_profile() -> VpnProfile {
        VpnProfile {
            name: Some("Work".into()),
            identifier: Some("3f1c".into()),
            server_address: Some("vpn.example.com".into()),
            has_certificate: Some(true),
        }
    }

    #[tokio::test]
    async fn test_nothing_found_has_no_details() {
        let signals = StaticSignals::new().with_interface(iface("en0", true, &["192.168.1.20"]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert!(!result.connected);
        assert_eq!(result.method, None);
        assert_eq!(result.interface, None);
        assert_eq!(result.address, None);
        assert_eq!(result.profile, None);
        assert!(result.discrepancies.is_empty());
    }

    #[tokio::test]
    async fn test_status_flag_without_address_is_downgraded() {
        let signals = StaticSignals::new()
            .with_vpn_service(ServiceStatus::new(ServiceState::Connected, Some("utun3".into()), work_profile()))
            .with_interface(iface("en0", true, &["192.168.1.20"]))
            .with_interface(iface("utun3", true, &["fe80::aa"]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert!(!result.connected);
        assert_eq!(result.address, None);
        assert!(result
            .discrepancies
            .iter()
            .any(|d| d.strategy == Strategy::ManagedService && d.note.contains("utun3")));
    }

    #[tokio::test]
    async fn test_vpn_plugin_parent_device_does_not_corroborate() {
        let conn = parse_nmcli_connections("Corp VPN:bbbb:vpn:wlp2s0:activated\n").remove(0);
        let signals = StaticSignals::new()
            .with_vpn_service(conn.to_status(None, VpnData::default()))
            .with_interface(iface("wlp2s0", true, &["192.168.1.20"]))
            .with_interface(iface("tun0", true, &[]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert!(!result.connected);
        assert_eq!(result.interface, None);
        assert_eq!(result.address, None);
    }

    #[tokio::test]
    async fn test_vpn_plugin_resolved_tunnel_corroborates() {
        let conn = parse_nmcli_connections("Corp VPN:bbbb:vpn:wlp2s0:activated\n").remove(0);
        let signals = StaticSignals::new()
            .with_vpn_service(conn.to_status(Some("tun0\n"), VpnData::default()))
            .with_interface(iface("wlp2s0", true, &["192.168.1.20"]))
            .with_interface(iface("tun0", true, &["10.8.0.6"]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert!(result.connected);
        assert_eq!(result.method, Some(Strategy::ManagedService));
        assert_eq!(result.interface.as_deref(), Some("tun0"));
        assert_eq!(result.address, Some("10.8.0.6".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_prefixed_interface_with_address_is_connected() {
        let signals = StaticSignals::new()
            .with_interface(iface("en0", true, &["192.168.1.20"]))
            .with_interface(iface("wg0", true, &["10.6.0.2"]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert!(result.connected);
        assert_eq!(result.method, Some(Strategy::InterfaceScan));
        assert_eq!(result.interface.as_deref(), Some("wg0"));
        assert_eq!(result.address, Some("10.6.0.2".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_corroborated_service_carries_profile() {
        let signals = StaticSignals::new()
            .with_vpn_service(ServiceStatus::new(ServiceState::Connected, Some("tun0".into()), work_profile()))
            .with_interface(iface("tun0", true, &["10.8.0.6"]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert!(result.connected);
        assert_eq!(result.method, Some(Strategy::ManagedService));
        assert_eq!(result.profile, Some(work_profile()));
    }

    #[tokio::test]
    async fn test_claim_without_candidates_accepts_any_vpn_interface() {
        let signals = StaticSignals::new()
            .with_tunnel(ServiceStatus::new(ServiceState::Connected, None, VpnProfile::named("Corp")))
            .with_interface(iface("utun5", true, &["100.64.0.3"]));
        let result = detector(signals).detect(CancellationToken::new()).await.unwrap();

        assert_eq!(result.method, Some(Strategy::TunnelProvider));
        assert_eq!(result.interface.as_deref(), Some("utun5"));
    }

    #[tokio::test]
    async fn test_configuration_consulted_only_without_privileges() {
        // A configured service bound to a non-prefixed device is visible only to strategy 4.
        let configured = ServiceStatus::new(ServiceState::Connected, Some("vpn-office".into()), VpnProfile::named("Office"));
        let interfaces = [iface("vpn-office", true, &["172.20.0.9"])];

        let mut privileged = StaticSignals::new().with_configured_service(configured.clone());
        let mut unprivileged = StaticSignals::new().without_privileges().with_configured_service(configured);
        for i in &interfaces {
            privileged = privileged.with_interface(i.clone());
            unprivileged = unprivileged.with_interface(i.clone());
        }

        let result = detector(privileged).detect(CancellationToken::new()).await.unwrap();
        assert!(!result.connected);

        let result = detector(unprivileged).detect(CancellationToken::new()).await.unwrap();
        assert!(result.connected);
        assert_eq!(result.method, Some(Strategy::ServiceConfiguration));
        assert_eq!(result.interface.as_deref(), Some("vpn-office"));
    }

    #[tokio::test]
    async fn test_detection_is_idempotent() {
        let signals = StaticSignals::new()
            .with_vpn_service(ServiceStatus::new(ServiceState::Connected, Some("tun0".into()), work_profile()))
            .with_interface(iface("tun0", true, &["10.8.0.6"]))
            .with_interface(iface("utun1", true, &["fe80::1"]));
        let detector = detector(signals);

        let first = detector.detect(CancellationToken::new()).await.unwrap();
        let mut second = detector.detect(CancellationToken::new()).await.unwrap();
        second.checked_at = first.checked_at;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cancelled_detection() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = detector(StaticSignals::new()).detect(cancel).await.unwrap_err();
        assert_eq!(err, SignalError::Cancelled);
    }
}
