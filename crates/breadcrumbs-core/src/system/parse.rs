//! Parsers for the text produced by OS networking commands
//!
//! Kept free of I/O so each format can be tested against captured output.

use std::net::IpAddr;

use serde::Deserialize;

use super::signals::{InterfaceSnapshot, ServiceState, ServiceStatus, SignalError, SignalResult, VpnProfile};

// ============================================================================
// Interfaces: `ip -j addr show` and `ifconfig`
// ============================================================================

#[derive(Debug, Deserialize)]
struct IpLink {
    ifname: String,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    addr_info: Vec<IpAddrInfo>,
}

#[derive(Debug, Deserialize)]
struct IpAddrInfo {
    local: Option<String>,
}

/// Parse the JSON emitted by `ip -j addr show`
pub fn parse_ip_json(output: &str) -> SignalResult<Vec<InterfaceSnapshot>> {
    let links: Vec<IpLink> = serde_json::from_str(output)
        .map_err(|e| SignalError::Failed(format!("unexpected `ip -j addr` output: {}", e)))?;

    Ok(links
        .into_iter()
        .map(|link| {
            let addresses = link
                .addr_info
                .iter()
                .filter_map(|a| a.local.as_deref())
                .filter_map(|s| s.parse::<IpAddr>().ok())
                .collect();
            InterfaceSnapshot::new(link.ifname, link.flags.iter().any(|f| f == "UP"), addresses)
        })
        .collect())
}

/// Parse BSD-style `ifconfig` output
pub fn parse_ifconfig(output: &str) -> Vec<InterfaceSnapshot> {
    let mut interfaces: Vec<InterfaceSnapshot> = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            // "utun3: flags=8051<UP,POINTOPOINT,RUNNING,MULTICAST> mtu 1380"
            let Some((name, rest)) = line.split_once(':') else {
                continue;
            };
            let is_up = rest
                .split_once('<')
                .and_then(|(_, flags)| flags.split_once('>'))
                .map(|(flags, _)| flags.split(',').any(|f| f == "UP"))
                .unwrap_or(false);
            interfaces.push(InterfaceSnapshot::new(name.trim(), is_up, Vec::new()));
            continue;
        }

        let mut tokens = line.split_whitespace();
        let family = tokens.next();
        if !matches!(family, Some("inet") | Some("inet6")) {
            continue;
        }
        let Some(raw) = tokens.next() else {
            continue;
        };
        // Strip "%utun3" zone suffixes and "addr:" prefixes from older net-tools
        let raw = raw.trim_start_matches("addr:");
        let raw = raw.split('%').next().unwrap_or(raw);
        let raw = raw.split('/').next().unwrap_or(raw);
        if let (Some(current), Ok(addr)) = (interfaces.last_mut(), raw.parse::<IpAddr>()) {
            current.addresses.push(addr);
        }
    }

    interfaces
}

// ============================================================================
// NetworkManager: `nmcli -t`
// ============================================================================

/// Split one line of `nmcli -t` output, honouring `\:` and `\\` escapes
pub fn split_nmcli_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// One row of `nmcli -t -f NAME,UUID,TYPE,DEVICE,STATE connection show`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmConnection {
    pub name: String,
    pub uuid: String,
    pub kind: String,
    pub device: Option<String>,
    pub state: Option<String>,
}

impl NmConnection {
    /// VPN plugin connection (OpenVPN, OpenConnect, strongSwan, ...)
    pub fn is_vpn(&self) -> bool {
        self.kind == "vpn"
    }

    /// Either a VPN plugin connection or a WireGuard profile
    pub fn is_tunnel(&self) -> bool {
        self.is_vpn() || self.kind == "wireguard"
    }

    /// Interface that carries this connection's traffic
    ///
    /// WireGuard rows name the tunnel itself. For a VPN plugin connection the
    /// `DEVICE` column is the parent link (e.g. `wlp2s0`), so the tunnel comes
    /// only from `GENERAL.IP-IFACE`; without it there is no candidate.
    pub fn tunnel_interface(&self, ip_iface: Option<&str>) -> Option<String> {
        if !self.is_vpn() {
            return self.device.clone();
        }
        let iface = ip_iface.map(str::trim).filter(|i| !i.is_empty() && *i != "--")?;
        (self.device.as_deref() != Some(iface)).then(|| iface.to_string())
    }

    /// Status claim for an active connection
    pub fn to_status(&self, ip_iface: Option<&str>, data: VpnData) -> ServiceStatus {
        ServiceStatus::new(
            self.service_state(),
            self.tunnel_interface(ip_iface),
            VpnProfile {
                name: Some(self.name.clone()),
                identifier: Some(self.uuid.clone()),
                server_address: data.server_address,
                has_certificate: Some(data.has_certificate),
            },
        )
    }

    pub fn service_state(&self) -> ServiceState {
        match self.state.as_deref() {
            Some("activated") => ServiceState::Connected,
            Some("activating") => ServiceState::Connecting,
            Some("deactivating") => ServiceState::Disconnecting,
            Some(_) => ServiceState::Invalid,
            None => ServiceState::Disconnected,
        }
    }
}

/// Parse `nmcli -t -f NAME,UUID,TYPE,DEVICE[,STATE] connection show`
pub fn parse_nmcli_connections(output: &str) -> Vec<NmConnection> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let fields = split_nmcli_fields(line);
            if fields.len() < 4 {
                return None;
            }
            let non_empty = |s: &String| if s.is_empty() || s == "--" { None } else { Some(s.clone()) };
            Some(NmConnection {
                name: fields[0].clone(),
                uuid: fields[1].clone(),
                kind: fields[2].clone(),
                device: non_empty(&fields[3]),
                state: fields.get(4).and_then(non_empty),
            })
        })
        .collect()
}

/// Server and credential details from `nmcli -g vpn.data connection show`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpnData {
    pub server_address: Option<String>,
    pub has_certificate: bool,
}

const SERVER_KEYS: &[&str] = &["gateway", "remote", "host", "server"];
const CERTIFICATE_KEYS: &[&str] = &["cert", "usercert", "ca", "cacert", "certificate"];

/// Parse the `key = value, key = value` list NetworkManager stores per VPN
pub fn parse_vpn_data(output: &str) -> VpnData {
    let mut data = VpnData::default();

    for pair in output.trim().split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if data.server_address.is_none() && SERVER_KEYS.contains(&key) {
            data.server_address = Some(value.to_string());
        }
        if CERTIFICATE_KEYS.contains(&key) {
            data.has_certificate = true;
        }
    }

    data
}

// ============================================================================
// WireGuard: `wg show all endpoints`
// ============================================================================

/// Parse `wg show all endpoints` into one status per tunnel interface
///
/// A tunnel whose peers have no endpoint has never completed a handshake
/// target and is reported as connecting.
pub fn parse_wg_endpoints(output: &str) -> Vec<ServiceStatus> {
    let mut statuses: Vec<ServiceStatus> = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            continue;
        }
        let (iface, peer, endpoint) = (fields[0], fields[1], fields[2]);
        let endpoint = (endpoint != "(none)").then(|| endpoint.to_string());

        if let Some(existing) = statuses.iter_mut().find(|s| s.interface.as_deref() == Some(iface)) {
            if existing.profile.server_address.is_none() && endpoint.is_some() {
                existing.profile.server_address = endpoint;
                existing.profile.identifier = Some(peer.to_string());
                existing.state = ServiceState::Connected;
            }
            continue;
        }

        let state = if endpoint.is_some() {
            ServiceState::Connected
        } else {
            ServiceState::Connecting
        };
        statuses.push(ServiceStatus::new(
            state,
            Some(iface.to_string()),
            VpnProfile {
                name: Some(iface.to_string()),
                identifier: Some(peer.to_string()),
                server_address: endpoint,
                has_certificate: Some(false),
            },
        ));
    }

    statuses
}

// ============================================================================
// macOS: `scutil --nc list` and `networksetup -listnetworkserviceorder`
// ============================================================================

/// One service from `scutil --nc list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScutilService {
    pub state: ServiceState,
    pub identifier: String,
    pub name: String,
    /// Bracketed type, e.g. `PPP/L2TP`, `IPSec`, `VPN/com.wireguard.macos`
    pub kind: String,
}

impl ScutilService {
    /// App-provided tunnel (Network Extension packet tunnel provider)
    pub fn is_tunnel_provider(&self) -> bool {
        self.kind.starts_with("VPN/")
    }

    pub fn into_status(self) -> ServiceStatus {
        ServiceStatus::new(
            self.state,
            None,
            VpnProfile {
                name: Some(self.name),
                identifier: Some(self.identifier),
                server_address: None,
                has_certificate: None,
            },
        )
    }
}

/// Parse `scutil --nc list`
pub fn parse_scutil_nc_list(output: &str) -> Vec<ScutilService> {
    output
        .lines()
        .filter_map(|line| {
            let open = line.find('(')?;
            let close = line[open..].find(')')? + open;
            let state = match &line[open + 1..close] {
                "Connected" => ServiceState::Connected,
                "Connecting" => ServiceState::Connecting,
                "Disconnecting" => ServiceState::Disconnecting,
                "Disconnected" => ServiceState::Disconnected,
                _ => ServiceState::Invalid,
            };
            let rest = &line[close + 1..];
            let identifier = rest.split_whitespace().next()?.to_string();
            let name_start = rest.find('"')?;
            let name_end = rest[name_start + 1..].find('"')? + name_start + 1;
            let name = rest[name_start + 1..name_end].to_string();
            let kind = rest
                .rfind('[')
                .and_then(|s| rest[s + 1..].find(']').map(|e| rest[s + 1..s + 1 + e].to_string()))
                .unwrap_or_default();
            Some(ScutilService {
                state,
                identifier,
                name,
                kind,
            })
        })
        .collect()
}

/// Parse `networksetup -listnetworkserviceorder` into (service, port, device)
pub fn parse_service_order(output: &str) -> Vec<(String, String, Option<String>)> {
    let mut services = Vec::new();
    let mut pending: Option<String> = None;

    for line in output.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("(Hardware Port:") {
            let Some(name) = pending.take() else {
                continue;
            };
            let rest = rest.trim_end_matches(')');
            let (port, device) = match rest.split_once(", Device:") {
                Some((port, device)) => (port.trim(), device.trim()),
                None => (rest.trim(), ""),
            };
            let device = (!device.is_empty()).then(|| device.to_string());
            services.push((name, port.to_string(), device));
        } else if line.starts_with('(') {
            // "(1) Wi-Fi" or "(*) Disabled Service"
            if let Some((_, name)) = line.split_once(") ") {
                pending = Some(name.to_string());
            }
        }
    }

    services
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP_JSON: &str = r#"[
        {"ifindex":1,"ifname":"lo","flags":["LOOPBACK","UP","LOWER_UP"],"operstate":"UNKNOWN",
         "addr_info":[{"family":"inet","local":"127.0.0.1","prefixlen":8}]},
        {"ifindex":2,"ifname":"eth0","flags":["BROADCAST","MULTICAST","UP","LOWER_UP"],"operstate":"UP",
         "addr_info":[{"family":"inet","local":"192.168.1.20","prefixlen":24},
                      {"family":"inet6","local":"fe80::a00:27ff:fe4e:66a1","prefixlen":64}]},
        {"ifindex":5,"ifname":"tun0","flags":["POINTOPOINT","NOARP"],"operstate":"DOWN","addr_info":[]}
    ]"#;

    #[test]
    fn test_parse_ip_json() {
        let ifaces = parse_ip_json(IP_JSON).unwrap();
        assert_eq!(ifaces.len(), 3);
        assert_eq!(ifaces[1].name, "eth0");
        assert!(ifaces[1].is_up);
        assert_eq!(ifaces[1].addresses.len(), 2);
        assert!(!ifaces[2].is_up);
        assert!(ifaces[2].addresses.is_empty());
    }

    #[test]
    fn test_parse_ip_json_rejects_garbage() {
        assert!(matches!(parse_ip_json("not json"), Err(SignalError::Failed(_))));
    }

    #[test]
    fn test_parse_ifconfig() {
        let output = "\
lo0: flags=8049<UP,LOOPBACK,RUNNING,MULTICAST> mtu 16384
\tinet 127.0.0.1 netmask 0xff000000
utun0: flags=8051<UP,POINTOPOINT,RUNNING,MULTICAST> mtu 1380
\tinet6 fe80::ce81:b1c:bd2c:69e%utun0 prefixlen 64 scopeid 0xc
utun3: flags=8051<UP,POINTOPOINT,RUNNING,MULTICAST> mtu 1400
\tinet 10.8.0.2 --> 10.8.0.1 netmask 0xffffff00
";
        let ifaces = parse_ifconfig(output);
        assert_eq!(ifaces.len(), 3);
        assert_eq!(ifaces[1].name, "utun0");
        assert_eq!(ifaces[1].addresses, vec!["fe80::ce81:b1c:bd2c:69e".parse::<IpAddr>().unwrap()]);
        assert!(!ifaces[1].is_active());
        assert_eq!(ifaces[2].primary_address(), Some("10.8.0.2".parse().unwrap()));
    }

    #[test]
    fn test_split_nmcli_fields_with_escapes() {
        let fields = split_nmcli_fields(r"Office\: Berlin:1234-abcd:vpn:tun0:activated");
        assert_eq!(fields, vec!["Office: Berlin", "1234-abcd", "vpn", "tun0", "activated"]);
    }

    #[test]
    fn test_parse_nmcli_connections() {
        let output = "Wired connection 1:aaaa:802-3-ethernet:eth0:activated\nCorp VPN:bbbb:vpn::\nhome-wg:cccc:wireguard:wg0:activating\n";
        let conns = parse_nmcli_connections(output);
        assert_eq!(conns.len(), 3);
        assert!(!conns[0].is_tunnel());
        assert!(conns[1].is_vpn());
        assert_eq!(conns[1].device, None);
        assert_eq!(conns[1].service_state(), ServiceState::Disconnected);
        assert_eq!(conns[2].service_state(), ServiceState::Connecting);
    }

    #[test]
    fn test_vpn_plugin_device_is_not_the_tunnel() {
        let conns = parse_nmcli_connections("Corp VPN:bbbb:vpn:wlp2s0:activated\nhome-wg:cccc:wireguard:wg0:activated\n");
        assert_eq!(conns[0].tunnel_interface(None), None);
        assert_eq!(conns[0].tunnel_interface(Some("wlp2s0\n")), None);
        assert_eq!(conns[0].tunnel_interface(Some("--")), None);
        assert_eq!(conns[0].tunnel_interface(Some("tun0\n")), Some("tun0".to_string()));
        assert_eq!(conns[1].tunnel_interface(None), Some("wg0".to_string()));

        let status = conns[0].to_status(None, VpnData::default());
        assert_eq!(status.interface, None);
        assert_eq!(status.state, ServiceState::Connected);
    }

    #[test]
    fn test_parse_vpn_data() {
        let data = parse_vpn_data("remote = vpn.example.com:1194, ca = /etc/openvpn/ca.crt, connection-type = tls");
        assert_eq!(data.server_address.as_deref(), Some("vpn.example.com:1194"));
        assert!(data.has_certificate);

        let data = parse_vpn_data("gateway = 203.0.113.9, user = alice");
        assert_eq!(data.server_address.as_deref(), Some("203.0.113.9"));
        assert!(!data.has_certificate);
    }

    #[test]
    fn test_parse_wg_endpoints() {
        let output = "wg0\tPEERKEY1=\t198.51.100.7:51820\nwg1\tPEERKEY2=\t(none)\n";
        let tunnels = parse_wg_endpoints(output);
        assert_eq!(tunnels.len(), 2);
        assert_eq!(tunnels[0].state, ServiceState::Connected);
        assert_eq!(tunnels[0].profile.server_address.as_deref(), Some("198.51.100.7:51820"));
        assert_eq!(tunnels[1].state, ServiceState::Connecting);
    }

    #[test]
    fn test_parse_scutil_nc_list() {
        let output = r#"Available network connection services in the current set (*=enabled):
* (Connected)      1C2B3A4D-0000-4000-8000-000000000001 PPP --> L2TP      "Work L2TP"                      [PPP/L2TP]
* (Disconnected)   5F6D3D4A-0000-4000-8000-000000000002 VPN (com.wireguard.macos) "Home WG"     [VPN/com.wireguard.macos]
"#;
        let services = parse_scutil_nc_list(output);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].state, ServiceState::Connected);
        assert_eq!(services[0].name, "Work L2TP");
        assert!(!services[0].is_tunnel_provider());
        assert!(services[1].is_tunnel_provider());
        assert_eq!(services[1].identifier, "5F6D3D4A-0000-4000-8000-000000000002");
    }

    #[test]
    fn test_parse_service_order() {
        let output = "An asterisk (*) denotes that a network service is disabled.
(1) Wi-Fi
(Hardware Port: Wi-Fi, Device: en0)

(2) Work VPN
(Hardware Port: L2TP, Device: )
";
        let services = parse_service_order(output);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0], ("Wi-Fi".to_string(), "Wi-Fi".to_string(), Some("en0".to_string())));
        assert_eq!(services[1].1, "L2TP");
        assert_eq!(services[1].2, None);
    }
}
