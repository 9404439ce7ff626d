//! Service configuration
//!
//! Sources, later ones winning:
//! - built-in defaults
//! - YAML file (`~/.config/breadcrumbs/config.yaml` or an explicit path)
//! - `BREADCRUMBS_*` environment variables

mod env;
mod error;
mod file;
mod service;

pub use env::{apply_env_overrides, ENV_PREFIX};
pub use error::{ConfigError, ConfigResult};
pub use file::ConfigFile;
pub use service::{LimitsConfig, ServerConfig, ServiceConfig, DEFAULT_BIND};
