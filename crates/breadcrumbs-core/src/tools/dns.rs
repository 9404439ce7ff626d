//! Hostname resolution

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::types::CancellationToken;

use super::arguments::ToolArguments;
use super::capability::{ParameterKind, ParameterSchema, ParameterSpec, ToolCapability, ToolError, ToolOutcome};

pub const DNS_LOOKUP_TOOL: &str = "dns_lookup";

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_HOSTNAME_LEN: usize = 253;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Family {
    #[default]
    Any,
    Ipv4,
    Ipv6,
}

impl Family {
    fn admits(&self, addr: &IpAddr) -> bool {
        match self {
            Family::Any => true,
            Family::Ipv4 => addr.is_ipv4(),
            Family::Ipv6 => addr.is_ipv6(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Family::Any => "any",
            Family::Ipv4 => "ipv4",
            Family::Ipv6 => "ipv6",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Args {
    host: String,
    #[serde(default)]
    family: Family,
}

/// Check that `host` is a syntactically valid hostname or IP literal
pub(crate) fn validate_host(tool: &str, host: &str) -> ToolOutcome<()> {
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if host.is_empty() {
        return Err(ToolError::invalid_arguments(tool, "host must not be empty"));
    }
    if host.len() > MAX_HOSTNAME_LEN {
        return Err(ToolError::invalid_arguments(
            tool,
            format!("host is longer than {} characters", MAX_HOSTNAME_LEN),
        ));
    }
    let labels_ok = host.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    if !labels_ok {
        return Err(ToolError::invalid_arguments(tool, format!("{:?} is not a valid hostname", host)));
    }
    Ok(())
}

/// Resolves a hostname through the system resolver
#[derive(Debug, Default)]
pub struct DnsLookupTool;

impl DnsLookupTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolCapability for DnsLookupTool {
    fn name(&self) -> &str {
        DNS_LOOKUP_TOOL
    }

    fn description(&self) -> &str {
        "Resolve a hostname to IP addresses using the system resolver. Useful for checking \
         whether DNS works and which addresses a service name points to."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::empty()
            .with(ParameterSpec::required("host", ParameterKind::String, "Hostname to resolve"))
            .with(ParameterSpec::optional(
                "family",
                ParameterKind::Enum(vec!["any".into(), "ipv4".into(), "ipv6".into()]),
                "Address family to return (default \"any\")",
            ))
    }

    async fn execute(&self, arguments: ToolArguments, cancel: CancellationToken) -> ToolOutcome<String> {
        let args: Args = arguments.decode(DNS_LOOKUP_TOOL)?;
        let host = args.host.trim();
        validate_host(DNS_LOOKUP_TOOL, host)?;

        let lookup = tokio::time::timeout(LOOKUP_TIMEOUT, tokio::net::lookup_host((host, 0)));
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ToolError::execution_failed(DNS_LOOKUP_TOOL, "cancelled")),
            result = lookup => match result {
                Err(_) => {
                    return Err(ToolError::execution_failed(
                        DNS_LOOKUP_TOOL,
                        format!("lookup of {} timed out after {}s", host, LOOKUP_TIMEOUT.as_secs()),
                    ))
                }
                Ok(Err(e)) => {
                    return Err(ToolError::execution_failed(DNS_LOOKUP_TOOL, format!("could not resolve {}: {}", host, e)))
                }
                Ok(Ok(addrs)) => addrs,
            },
        };

        let mut addresses: Vec<IpAddr> = Vec::new();
        for addr in resolved.map(|sa| sa.ip()).filter(|ip| args.family.admits(ip)) {
            if !addresses.contains(&addr) {
                addresses.push(addr);
            }
        }
        if addresses.is_empty() {
            return Err(ToolError::execution_failed(
                DNS_LOOKUP_TOOL,
                format!("{} has no {} addresses", host, args.family.as_str()),
            ));
        }

        serde_json::to_string_pretty(&json!({
            "host": host,
            "family": args.family.as_str(),
            "addresses": addresses,
        }))
        .map_err(|e| ToolError::execution_failed(DNS_LOOKUP_TOOL, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_validation() {
        assert!(validate_host(DNS_LOOKUP_TOOL, "example.com").is_ok());
        assert!(validate_host(DNS_LOOKUP_TOOL, "example.com.").is_ok());
        assert!(validate_host(DNS_LOOKUP_TOOL, "::1").is_ok());
        assert!(validate_host(DNS_LOOKUP_TOOL, "").is_err());
        assert!(validate_host(DNS_LOOKUP_TOOL, "exa mple.com").is_err());
        assert!(validate_host(DNS_LOOKUP_TOOL, "-bad.example.com").is_err());
        assert!(validate_host(DNS_LOOKUP_TOOL, &"a".repeat(300)).is_err());
    }

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let output = DnsLookupTool::new()
            .execute(ToolArguments::new().with("host", "127.0.0.1"), CancellationToken::new())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["addresses"][0], "127.0.0.1");
    }

    #[tokio::test]
    async fn test_family_filter_with_no_match_fails() {
        let err = DnsLookupTool::new()
            .execute(
                ToolArguments::new().with("host", "127.0.0.1").with("family", "ipv6"),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "execution_failed");
    }

    #[tokio::test]
    async fn test_missing_host_is_invalid() {
        let err = DnsLookupTool::new()
            .execute(ToolArguments::new(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_arguments");
    }
}
