//! Diagnostic tools
//!
//! Every tool implements [`ToolCapability`]; the [`ToolRegistry`] holds them,
//! presents their catalog to the model and dispatches calls by name.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │                                             │
//! │  - Catalog (name, description, schema)      │
//! │  - Dispatch by name                         │
//! │  - Argument parsing, failures as results    │
//! └─────────────────────────────────────────────┘
//!           │
//!           │ execute(arguments, cancel)
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  Built-in tools                             │
//! │    - vpn_detector                           │
//! │    - network_interfaces                     │
//! │    - dns_lookup                             │
//! │    - tcp_probe                              │
//! └─────────────────────────────────────────────┘
//!           │
//!           │ SystemSignals
//!           ▼
//!     host OS (nmcli, wg, ip, scutil, ...)
//! ```

mod arguments;
mod capability;
mod dns;
mod interfaces;
mod registry;
mod tcp_probe;
pub mod vpn;

pub use arguments::{ArgumentParseError, NoArguments, ToolArguments};
pub use capability::{ParameterKind, ParameterSchema, ParameterSpec, ToolCapability, ToolError, ToolOutcome};
pub use dns::{DnsLookupTool, DNS_LOOKUP_TOOL};
pub use interfaces::{NetworkInterfacesTool, NETWORK_INTERFACES_TOOL};
pub use registry::{RegistryError, ToolRegistry};
pub use tcp_probe::{TcpProbeTool, TCP_PROBE_TOOL};
pub use vpn::{VpnDetectionResult, VpnDetector, VpnDetectorTool, VPN_DETECTOR_TOOL};
