//! Environment variable overrides

use super::error::{ConfigError, ConfigResult};
use super::service::ServiceConfig;

pub const ENV_PREFIX: &str = "BREADCRUMBS_";

/// Apply `BREADCRUMBS_*` overrides read through `lookup`
///
/// Empty values are ignored. Numeric values that do not parse are errors
/// rather than silently falling back to the file value.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |suffix: &str| -> Option<(String, String)> {
        let name = format!("{}{}", ENV_PREFIX, suffix);
        lookup(&name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (name, v))
    };

    if let Some((_, provider)) = get("PROVIDER") {
        config.model.provider = provider;
    }
    if let Some((_, model)) = get("MODEL") {
        config.model.model = model;
    }
    if let Some((_, base)) = get("API_BASE") {
        config.model.api_base = Some(base);
    }
    if let Some((_, bind)) = get("BIND") {
        config.server.bind = bind;
    }
    if let Some((_, keys)) = get("API_KEYS") {
        config.server.api_keys = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some((name, secs)) = get("TIMEOUT_SECS") {
        config.limits.timeout_secs = secs
            .parse()
            .map_err(|e| ConfigError::invalid(name, format!("{:?}: {}", secs, e)))?;
    }
    if let Some((name, max)) = get("MAX_CONCURRENT") {
        config.limits.max_concurrent_requests = max
            .parse()
            .map_err(|e| ConfigError::invalid(name, format!("{:?}: {}", max, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_overrides() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(
            &mut config,
            lookup(&[
                ("BREADCRUMBS_PROVIDER", "ollama"),
                ("BREADCRUMBS_MODEL", "llama3.1"),
                ("BREADCRUMBS_API_KEYS", "demo-key-123, other-key ,"),
                ("BREADCRUMBS_TIMEOUT_SECS", "12"),
                ("BREADCRUMBS_BIND", ""),
            ]),
        )
        .unwrap();

        assert_eq!(config.model.provider, "ollama");
        assert_eq!(config.model.model, "llama3.1");
        assert_eq!(config.server.api_keys, vec!["demo-key-123", "other-key"]);
        assert_eq!(config.limits.timeout_secs, 12);
        assert_eq!(config.server.bind, "127.0.0.1:8181");
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let mut config = ServiceConfig::default();
        let err = apply_env_overrides(&mut config, lookup(&[("BREADCRUMBS_MAX_CONCURRENT", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BREADCRUMBS_MAX_CONCURRENT"));
    }
}
