//! Environment variable secret store

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Provider id to the variables that may hold its key, in lookup order
static ENV_VAR_MAP: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert("openai", &["OPENAI_API_KEY"]);
    m.insert("anthropic", &["ANTHROPIC_API_KEY"]);
    m.insert("gemini", &["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("google", &["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", &["GROQ_API_KEY"]);
    m.insert("xai", &["XAI_API_KEY"]);
    m.insert("deepseek", &["DEEPSEEK_API_KEY"]);
    m.insert("mistral", &["MISTRAL_API_KEY"]);
    m.insert("azure", &["AZURE_API_KEY", "AZURE_OPENAI_API_KEY"]);
    m.insert("openrouter", &["OPENROUTER_API_KEY"]);
    m.insert("ollama", &[]);
    m
});

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Read-only store backed by environment variables
///
/// `get("openai")` checks `OPENAI_API_KEY`; unknown providers fall back to
/// `<PROVIDER>_API_KEY`. A full variable name is also accepted as a key.
/// Empty values count as unset.
#[derive(Clone)]
pub struct EnvSecretStore {
    lookup: Lookup,
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSecretStore").finish_non_exhaustive()
    }
}

impl EnvSecretStore {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Read from a custom variable source
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self { lookup: Arc::new(lookup) }
    }

    /// Variables consulted for a provider id
    pub fn env_vars_for_provider(provider: &str) -> Vec<String> {
        let provider = provider.to_lowercase();
        match ENV_VAR_MAP.get(provider.as_str()) {
            Some(vars) => vars.iter().map(|v| v.to_string()).collect(),
            None => vec![format!("{}_API_KEY", provider.to_uppercase())],
        }
    }

    fn read(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.read(key).or_else(|| {
            Self::env_vars_for_provider(key)
                .iter()
                .find_map(|var| self.read(var))
        })
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}
