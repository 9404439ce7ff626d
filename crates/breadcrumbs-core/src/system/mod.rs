//! Observation of the host's network state
//!
//! The diagnostic tools never touch the OS directly; they read through
//! [`SystemSignals`], so the same reconciliation code runs against the live
//! machine ([`HostSignals`]) and against recorded snapshots ([`StaticSignals`]).

mod signals;
mod command;
mod fixed;
mod host;
pub mod parse;

pub use signals::{
    InterfaceSnapshot, ServiceState, ServiceStatus, SignalError, SignalResult, SystemSignals,
    VpnProfile,
};
pub use command::{run_command, COMMAND_TIMEOUT};
pub use fixed::StaticSignals;
pub use host::HostSignals;
