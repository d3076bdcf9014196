//! Entry builders and orchestration for the DPDK software pipeline.
//!
//! The DPDK table set is the smaller of the two profiles: a single
//! forwarding table keyed on destination MAC, a receive-side tunnel
//! table, one IPv4 encap-mod table, and one IPv4 termination table.
//! VLAN mod tables and source-port mapping are not part of this
//! pipeline.

use crate::error::{BuildError, ProgramError};
use crate::profile::{PipelineProfile, ProgramContext, TxnLog};
use crate::tables::dpdk::*;
use async_trait::async_trait;
use p4ovs_p4rt::codec::{encode_ipv4, encode_mac, encode_uint};
use p4ovs_p4rt::{EntryOp, PipelineSchema, TableEntry};
use p4ovs_types::{MacLearningInfo, SrcPortInfo, TunnelInfo};
use std::net::IpAddr;

/// DPDK software pipeline profile.
pub struct DpdkProfile;

const PROFILE_NAME: &str = "dpdk";

fn unsupported(op: &'static str) -> ProgramError {
    ProgramError::UnsupportedOnProfile {
        op,
        profile: PROFILE_NAME,
    }
}

fn v4_pair(tunnel: &TunnelInfo) -> Result<(std::net::Ipv4Addr, std::net::Ipv4Addr), BuildError> {
    match (tunnel.local_ip, tunnel.remote_ip) {
        (IpAddr::V4(local), IpAddr::V4(remote)) => Ok((local, remote)),
        (IpAddr::V6(_), IpAddr::V6(_)) => Err(BuildError::Ipv6NotSupported),
        _ => Err(BuildError::MixedAddressFamily),
    }
}

/// UDP port fields in the encap action are consumed byte-swapped by the
/// pipeline, so the wire bytes carry the port in host (little-endian)
/// order.
fn encode_udp_port_swapped(port: u16) -> Vec<u8> {
    vec![(port & 0xff) as u8, (port >> 8) as u8]
}

/// Forwarding entry for a plain (non-tunnel, non-VLAN) learned MAC:
/// exact destination-MAC key, forward to the learning port.
pub fn fdb_tx_plain_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_TX_TABLE)?);
    entry.match_exact(
        schema.match_field_id(L2_FWD_TX_TABLE, L2_FWD_TX_KEY_DST_MAC)?,
        encode_mac(&learn.mac_addr),
    );

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_L2_FWD)?);
        action.param(
            schema.param_id(ACTION_L2_FWD, PARAM_PORT)?,
            encode_uint(u64::from(learn.src_port), 1),
        );
    }
    Ok(entry)
}

/// Forwarding entry for a VLAN-backed learned MAC. The egress port of a
/// VLAN netdev is derived from its VLAN id, offset by one.
pub fn fdb_tx_vlan_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_TX_TABLE)?);
    entry.match_exact(
        schema.match_field_id(L2_FWD_TX_TABLE, L2_FWD_TX_KEY_DST_MAC)?,
        encode_mac(&learn.mac_addr),
    );

    if op.is_insert() {
        let port_id = learn.vlan.vlan_id.wrapping_sub(1);
        let action = entry.set_action(schema.action_id(ACTION_L2_FWD)?);
        action.param(
            schema.param_id(ACTION_L2_FWD, PARAM_PORT)?,
            encode_uint(u64::from(port_id), 1),
        );
    }
    Ok(entry)
}

/// Receive-side forwarding entry paired with [`fdb_tx_vlan_entry`].
pub fn fdb_rx_with_tunnel_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_RX_WITH_TUNNEL_TABLE)?);
    entry.match_exact(
        schema.match_field_id(L2_FWD_RX_WITH_TUNNEL_TABLE, L2_FWD_RX_KEY_DST_MAC)?,
        encode_mac(&learn.mac_addr),
    );

    if op.is_insert() {
        let port_id = learn.vlan.vlan_id.wrapping_sub(1);
        let action = entry.set_action(schema.action_id(ACTION_L2_FWD)?);
        action.param(
            schema.param_id(ACTION_L2_FWD, PARAM_PORT)?,
            encode_uint(u64::from(port_id), 1),
        );
    }
    Ok(entry)
}

/// Forwarding entry steering a tunnel-learned MAC into the encap path.
pub fn fdb_tx_tunnel_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let tunnel = learn.tunnel.as_ref().ok_or(BuildError::MissingTunnelInfo)?;
    let (_, remote) = v4_pair(tunnel)?;

    let mut entry = TableEntry::new(schema.table_id(L2_FWD_TX_TABLE)?);
    entry.match_exact(
        schema.match_field_id(L2_FWD_TX_TABLE, L2_FWD_TX_KEY_DST_MAC)?,
        encode_mac(&learn.mac_addr),
    );

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_SET_TUNNEL)?);
        action.param(
            schema.param_id(ACTION_SET_TUNNEL, PARAM_TUNNEL_ID)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
        action.param(
            schema.param_id(ACTION_SET_TUNNEL, PARAM_DST_ADDR)?,
            encode_ipv4(remote),
        );
    }
    Ok(entry)
}

/// Encap-mod entry: the mod-blob pointer keyed by VNI selects the VXLAN
/// header template.
pub fn encap_entry(
    schema: &PipelineSchema,
    tunnel: &TunnelInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let (local, remote) = v4_pair(tunnel)?;

    let mut entry = TableEntry::new(schema.table_id(VXLAN_ENCAP_MOD_TABLE)?);
    entry.match_exact(
        schema.match_field_id(VXLAN_ENCAP_MOD_TABLE, ENCAP_KEY_MOD_DATA_PTR)?,
        encode_uint(u64::from(tunnel.vni), 1),
    );

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_VXLAN_ENCAP)?);
        action.param(
            schema.param_id(ACTION_VXLAN_ENCAP, PARAM_SRC_ADDR)?,
            encode_ipv4(local),
        );
        action.param(
            schema.param_id(ACTION_VXLAN_ENCAP, PARAM_DST_ADDR)?,
            encode_ipv4(remote),
        );
        action.param(
            schema.param_id(ACTION_VXLAN_ENCAP, PARAM_DST_PORT)?,
            encode_udp_port_swapped(tunnel.dst_port),
        );
        action.param(
            schema.param_id(ACTION_VXLAN_ENCAP, PARAM_VNI)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
    }
    Ok(entry)
}

/// Termination entry: remote source, VXLAN tunnel type, and local
/// destination keys; decap on insert.
pub fn tunnel_term_entry(
    schema: &PipelineSchema,
    tunnel: &TunnelInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let (local, remote) = v4_pair(tunnel)?;

    let mut entry = TableEntry::new(schema.table_id(IPV4_TUNNEL_TERM_TABLE)?);
    entry.match_exact(
        schema.match_field_id(IPV4_TUNNEL_TERM_TABLE, TERM_KEY_IPV4_SRC)?,
        encode_ipv4(remote),
    );
    entry.match_exact(
        schema.match_field_id(IPV4_TUNNEL_TERM_TABLE, TERM_KEY_TUNNEL_TYPE)?,
        encode_uint(u64::from(TUNNEL_TYPE_VXLAN), 1),
    );
    entry.match_exact(
        schema.match_field_id(IPV4_TUNNEL_TERM_TABLE, TERM_KEY_IPV4_DST)?,
        encode_ipv4(local),
    );

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_DECAP_OUTER_IPV4)?);
        action.param(
            schema.param_id(ACTION_DECAP_OUTER_IPV4, PARAM_TUNNEL_ID)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
    }
    Ok(entry)
}

#[async_trait]
impl PipelineProfile for DpdkProfile {
    fn name(&self) -> &'static str {
        PROFILE_NAME
    }

    async fn program_fdb(
        &self,
        ctx: &ProgramContext<'_>,
        learn: &MacLearningInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        let mut txn = TxnLog::new();
        if learn.is_tunnel {
            let entry = fdb_tx_tunnel_entry(ctx.schema, learn, op)?;
            txn.write(ctx, L2_FWD_TX_TABLE, op, entry).await;
        } else if learn.is_vlan {
            let tx = fdb_tx_vlan_entry(ctx.schema, learn, op)?;
            let rx = fdb_rx_with_tunnel_entry(ctx.schema, learn, op)?;
            txn.write(ctx, L2_FWD_TX_TABLE, op, tx).await;
            txn.write(ctx, L2_FWD_RX_WITH_TUNNEL_TABLE, op, rx).await;
        } else {
            let entry = fdb_tx_plain_entry(ctx.schema, learn, op)?;
            txn.write(ctx, L2_FWD_TX_TABLE, op, entry).await;
        }
        txn.finish()
    }

    async fn program_tunnel(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        // Encap template before termination so a partially-programmed
        // tunnel never terminates traffic it cannot re-encapsulate.
        let encap = encap_entry(ctx.schema, tunnel, op)?;
        let term = tunnel_term_entry(ctx.schema, tunnel, op)?;

        let mut txn = TxnLog::new();
        txn.write(ctx, VXLAN_ENCAP_MOD_TABLE, op, encap).await;
        txn.write(ctx, IPV4_TUNNEL_TERM_TABLE, op, term).await;
        txn.finish()
    }

    async fn program_tunnel_term(
        &self,
        _ctx: &ProgramContext<'_>,
        _tunnel: &TunnelInfo,
        _op: EntryOp,
    ) -> Result<(), ProgramError> {
        Err(unsupported("tunnel_term"))
    }

    async fn program_rx_tunnel_src_port(
        &self,
        _ctx: &ProgramContext<'_>,
        _tunnel: &TunnelInfo,
        _op: EntryOp,
    ) -> Result<(), ProgramError> {
        Err(unsupported("rx_tunnel_src_port"))
    }

    async fn program_vlan(
        &self,
        _ctx: &ProgramContext<'_>,
        _vlan_id: u16,
        _op: EntryOp,
    ) -> Result<(), ProgramError> {
        Err(unsupported("vlan"))
    }

    async fn program_tunnel_src_port(
        &self,
        _ctx: &ProgramContext<'_>,
        _sp: &SrcPortInfo,
        _op: EntryOp,
    ) -> Result<(), ProgramError> {
        Err(unsupported("tunnel_src_port"))
    }

    async fn program_vsi_src_port(
        &self,
        _ctx: &ProgramContext<'_>,
        _sp: &SrcPortInfo,
        _op: EntryOp,
    ) -> Result<(), ProgramError> {
        Err(unsupported("vsi_src_port"))
    }
}
