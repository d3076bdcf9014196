//! Per-port VLAN tagging configuration carried by dataplane events.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Port VLAN tagging mode.
///
/// Determines which action variant the entry builders choose for
/// forwarding and encap/decap tables: a `NativeUntagged` port needs the
/// VLAN header popped before encapsulation and pushed back after
/// decapsulation, a `NativeTagged` port keeps the tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortVlanMode {
    /// Untagged access port.
    Access,
    /// Trunk port with a native VLAN, frames tagged on the wire.
    NativeTagged,
    /// Trunk port with a native VLAN, frames untagged on the wire.
    NativeUntagged,
}

impl fmt::Display for PortVlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortVlanMode::Access => "access",
            PortVlanMode::NativeTagged => "native_tagged",
            PortVlanMode::NativeUntagged => "native_untagged",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PortVlanMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(PortVlanMode::Access),
            "native_tagged" => Ok(PortVlanMode::NativeTagged),
            "native_untagged" => Ok(PortVlanMode::NativeUntagged),
            other => Err(ParseError::InvalidVlanMode(other.to_string())),
        }
    }
}

/// VLAN linkage of the port an event was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanInfo {
    /// Tagging mode of the port.
    pub mode: PortVlanMode,
    /// Port VLAN identifier (1-4094).
    pub vlan_id: u16,
}

impl VlanInfo {
    pub const fn new(mode: PortVlanMode, vlan_id: u16) -> Self {
        Self { mode, vlan_id }
    }
}

impl Default for VlanInfo {
    fn default() -> Self {
        Self {
            mode: PortVlanMode::Access,
            vlan_id: 1,
        }
    }
}
