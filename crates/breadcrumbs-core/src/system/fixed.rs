//! Signals replayed from a fixed snapshot

use async_trait::async_trait;

use super::signals::{InterfaceSnapshot, ServiceStatus, SignalError, SignalResult, SystemSignals};

/// `SystemSignals` that always answers from the same snapshot
///
/// Used by tests and for replaying a machine state captured elsewhere.
/// Every source defaults to "present but empty".
#[derive(Debug, Clone)]
pub struct StaticSignals {
    pub vpn_service: SignalResult<Option<ServiceStatus>>,
    pub tunnel_providers: SignalResult<Vec<ServiceStatus>>,
    pub interfaces: SignalResult<Vec<InterfaceSnapshot>>,
    pub configuration: SignalResult<Vec<ServiceStatus>>,
}

impl Default for StaticSignals {
    fn default() -> Self {
        Self {
            vpn_service: Ok(None),
            tunnel_providers: Ok(Vec::new()),
            interfaces: Ok(Vec::new()),
            configuration: Ok(Vec::new()),
        }
    }
}

impl StaticSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vpn_service(mut self, status: ServiceStatus) -> Self {
        self.vpn_service = Ok(Some(status));
        self
    }

    pub fn with_tunnel(mut self, status: ServiceStatus) -> Self {
        if let Ok(tunnels) = self.tunnel_providers.as_mut() {
            tunnels.push(status);
        }
        self
    }

    pub fn with_interface(mut self, interface: InterfaceSnapshot) -> Self {
        if let Ok(interfaces) = self.interfaces.as_mut() {
            interfaces.push(interface);
        }
        self
    }

    pub fn with_configured_service(mut self, status: ServiceStatus) -> Self {
        if let Ok(services) = self.configuration.as_mut() {
            services.push(status);
        }
        self
    }

    /// Make both managed-service sources fail as they do without privileges
    pub fn without_privileges(mut self) -> Self {
        self.vpn_service = Err(SignalError::PermissionDenied("VPN service status".to_string()));
        self.tunnel_providers = Err(SignalError::PermissionDenied("tunnel providers".to_string()));
        self
    }
}

#[async_trait]
impl SystemSignals for StaticSignals {
    async fn vpn_service_status(&self) -> SignalResult<Option<ServiceStatus>> {
        self.vpn_service.clone()
    }

    async fn tunnel_provider_statuses(&self) -> SignalResult<Vec<ServiceStatus>> {
        self.tunnel_providers.clone()
    }

    async fn interfaces(&self) -> SignalResult<Vec<InterfaceSnapshot>> {
        self.interfaces.clone()
    }

    async fn network_service_configuration(&self) -> SignalResult<Vec<ServiceStatus>> {
        self.configuration.clone()
    }
}
