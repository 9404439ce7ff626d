//! Injected logging used by every component

mod traits;
mod noop;
mod console;

pub use traits::{Logger, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::{ConsoleLogger, LOG_LEVEL_ENV};
