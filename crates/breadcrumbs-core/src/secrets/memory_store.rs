//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Read-write secret store held in process memory
///
/// Used by tests and by callers that receive credentials at runtime.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one secret already stored
    pub fn with_secret(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.secrets.write().insert(key.into(), value.into());
        store
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("openai"), None);

        store.store("openai", "sk-1").unwrap();
        store.store("openai", "sk-2").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("openai").as_deref(), Some("sk-2"));

        store.delete("openai").unwrap();
        assert!(!store.has("openai"));
        assert_eq!(
            store.delete("openai"),
            Err(SecretStoreError::NotFound("openai".to_string()))
        );
    }

    #[test]
    fn test_with_secret() {
        let store = MemorySecretStore::with_secret("anthropic", "sk-ant");
        assert_eq!(store.name(), "memory");
        assert!(store.has("anthropic"));
    }
}
