//! Dataplane event records handed to the translation core.
//!
//! Each record mirrors one notification from the software switch: an FDB
//! learning/ageing event, a tunnel port add/remove, or a source-port to
//! bridge mapping change. Records are immutable per call and never
//! retained by the core.

use crate::{MacAddress, VlanInfo};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A VXLAN tunnel add/remove event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelInfo {
    /// Local underlay endpoint address.
    pub local_ip: IpAddr,
    /// Remote underlay endpoint address.
    pub remote_ip: IpAddr,
    /// VXLAN network identifier.
    pub vni: u32,
    /// UDP source port used by the remote VTEP.
    pub src_port: u16,
    /// UDP destination port (4789 for standard VXLAN).
    pub dst_port: u16,
    /// Bridge the tunnel port is attached to.
    pub bridge_id: u8,
    /// VLAN configuration of the tunnel port.
    pub vlan: VlanInfo,
}

impl TunnelInfo {
    /// Returns true if both endpoints are IPv4.
    pub fn is_v4(&self) -> bool {
        self.local_ip.is_ipv4() && self.remote_ip.is_ipv4()
    }

    /// Returns true if both endpoints are IPv6.
    pub fn is_v6(&self) -> bool {
        self.local_ip.is_ipv6() && self.remote_ip.is_ipv6()
    }
}

/// An FDB (MAC learning) event.
///
/// `tunnel` must be populated when `is_tunnel` is set; the builders treat
/// a tunnel-classified event without tunnel linkage as a build error.
/// On delete, `is_tunnel` may be reclassified by reconciliation before the
/// delete sequence runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacLearningInfo {
    /// The learned (or aged-out) station address.
    pub mac_addr: MacAddress,
    /// Port the address was learned on.
    pub src_port: u32,
    /// Bridge the port belongs to.
    pub bridge_id: u8,
    /// True if the address was learned over a tunnel port.
    pub is_tunnel: bool,
    /// True if the address was learned on a VLAN-backed port.
    pub is_vlan: bool,
    /// VLAN configuration of the learning port.
    pub vlan: VlanInfo,
    /// Tunnel linkage for tunnel-learned addresses.
    pub tunnel: Option<TunnelInfo>,
}

/// A source-port to bridge mapping event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcPortInfo {
    /// Source port identifier.
    pub src_port: u32,
    /// VLAN the mapping applies to.
    pub vlan_id: u16,
    /// Target bridge identifier.
    pub bridge_id: u8,
}
