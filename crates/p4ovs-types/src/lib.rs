//! Native value types and dataplane event records for the p4ovs bridge.
//!
//! These are the inputs handed to the translation core by the switch's
//! event listeners:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`PortVlanMode`] / [`VlanInfo`]: per-port VLAN tagging configuration
//! - [`MacLearningInfo`]: an FDB learning/ageing event
//! - [`TunnelInfo`]: a VXLAN tunnel add/remove event
//! - [`SrcPortInfo`]: a source-port-to-bridge mapping event
//!
//! Event records are owned by the caller and passed by reference into the
//! core; nothing here outlives a single translation call.

mod events;
mod mac;
mod vlan;

pub use events::{MacLearningInfo, SrcPortInfo, TunnelInfo};
pub use mac::MacAddress;
pub use vlan::{PortVlanMode, VlanInfo};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid VLAN mode: {0}")]
    InvalidVlanMode(String),
}
