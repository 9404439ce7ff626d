//! Credential storage for model services
//!
//! - `SecretStore` trait for implementing custom stores
//! - `EnvSecretStore`: read-only, environment variables
//! - `MemorySecretStore`: read-write, in process

mod traits;
mod env_store;
mod memory_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
