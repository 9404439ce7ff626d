//! Signals read from the live machine

use std::sync::Arc;

use async_trait::async_trait;

use crate::log_debug;
use crate::logging::Logger;

use super::command::run_command;
use super::parse::{
    parse_ifconfig, parse_ip_json, parse_nmcli_connections, parse_scutil_nc_list,
    parse_service_order, parse_vpn_data, parse_wg_endpoints,
};
use super::signals::{
    InterfaceSnapshot, ServiceState, ServiceStatus, SignalError, SignalResult, SystemSignals,
    VpnProfile,
};

/// Hardware ports macOS uses for configured VPN services
const MACOS_VPN_PORTS: &[&str] = &["L2TP", "PPTP", "IPSec", "IKEv2", "VPN"];

/// `SystemSignals` backed by OS commands
///
/// Linux reads NetworkManager (`nmcli`), WireGuard (`wg`) and `ip`; macOS
/// reads `scutil`, `networksetup` and `ifconfig`.
pub struct HostSignals {
    logger: Arc<dyn Logger>,
}

impl HostSignals {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    async fn nmcli_vpn_status(&self) -> SignalResult<Option<ServiceStatus>> {
        let output = run_command(
            "nmcli",
            &["-t", "-f", "NAME,UUID,TYPE,DEVICE,STATE", "connection", "show", "--active"],
        )
        .await?;

        let Some(conn) = parse_nmcli_connections(&output).into_iter().find(|c| c.is_vpn()) else {
            return Ok(None);
        };

        // Profile details are best effort; the status stands without them.
        let data = match run_command("nmcli", &["-g", "vpn.data", "connection", "show", &conn.uuid]).await {
            Ok(out) => parse_vpn_data(&out),
            Err(e) => {
                log_debug!(self.logger, "[HostSignals] vpn.data unavailable for {}: {}", conn.name, e);
                Default::default()
            }
        };

        let ip_iface = if conn.is_vpn() {
            self.nmcli_ip_iface(&conn.uuid).await
        } else {
            None
        };
        Ok(Some(conn.to_status(ip_iface.as_deref(), data)))
    }

    /// Tunnel device of an active VPN plugin connection
    async fn nmcli_ip_iface(&self, uuid: &str) -> Option<String> {
        match run_command("nmcli", &["-g", "GENERAL.IP-IFACE", "connection", "show", uuid]).await {
            Ok(out) => Some(out.trim().to_string()),
            Err(e) => {
                log_debug!(self.logger, "[HostSignals] GENERAL.IP-IFACE unavailable for {}: {}", uuid, e);
                None
            }
        }
    }

    async fn scutil_services(&self) -> SignalResult<Vec<super::parse::ScutilService>> {
        let output = run_command("scutil", &["--nc", "list"]).await?;
        Ok(parse_scutil_nc_list(&output))
    }
}

#[async_trait]
impl SystemSignals for HostSignals {
    async fn vpn_service_status(&self) -> SignalResult<Option<ServiceStatus>> {
        if cfg!(target_os = "macos") {
            let services = self.scutil_services().await?;
            let managed: Vec<_> = services.into_iter().filter(|s| !s.is_tunnel_provider()).collect();
            // Prefer whichever profile is not idle; fall back to the first configured one.
            let chosen = managed
                .iter()
                .position(|s| s.state != ServiceState::Disconnected)
                .unwrap_or(0);
            return Ok(managed.into_iter().nth(chosen).map(|s| s.into_status()));
        }
        self.nmcli_vpn_status().await
    }

    async fn tunnel_provider_statuses(&self) -> SignalResult<Vec<ServiceStatus>> {
        if cfg!(target_os = "macos") {
            let services = self.scutil_services().await?;
            return Ok(services
                .into_iter()
                .filter(|s| s.is_tunnel_provider())
                .map(|s| s.into_status())
                .collect());
        }
        let output = run_command("wg", &["show", "all", "endpoints"]).await?;
        Ok(parse_wg_endpoints(&output))
    }

    async fn interfaces(&self) -> SignalResult<Vec<InterfaceSnapshot>> {
        match run_command("ip", &["-j", "addr", "show"]).await {
            Ok(output) => parse_ip_json(&output),
            Err(SignalError::Unavailable(reason)) => {
                log_debug!(self.logger, "[HostSignals] {}; falling back to ifconfig", reason);
                let output = run_command("ifconfig", &["-a"]).await?;
                Ok(parse_ifconfig(&output))
            }
            Err(e) => Err(e),
        }
    }

    async fn network_service_configuration(&self) -> SignalResult<Vec<ServiceStatus>> {
        if cfg!(target_os = "macos") {
            let output = run_command("networksetup", &["-listnetworkserviceorder"]).await?;
            return Ok(parse_service_order(&output)
                .into_iter()
                .filter(|(_, port, _)| MACOS_VPN_PORTS.contains(&port.as_str()))
                .map(|(name, _, device)| {
                    let state = if device.is_some() {
                        ServiceState::Connected
                    } else {
                        ServiceState::Disconnected
                    };
                    ServiceStatus::new(state, device, VpnProfile::named(name))
                })
                .collect());
        }

        let output = run_command(
            "nmcli",
            &["-t", "-f", "NAME,UUID,TYPE,DEVICE", "connection", "show"],
        )
        .await?;
        Ok(parse_nmcli_connections(&output)
            .into_iter()
            .filter(|c| c.is_tunnel())
            .map(|c| {
                // The configuration store only knows whether a profile is bound to a device.
                let state = if c.device.is_some() {
                    ServiceState::Connected
                } else {
                    ServiceState::Disconnected
                };
                ServiceStatus::new(
                    state,
                    c.tunnel_interface(None),
                    VpnProfile {
                        name: Some(c.name),
                        identifier: Some(c.uuid),
                        server_address: None,
                        has_certificate: None,
                    },
                )
            })
            .collect())
    }
}
