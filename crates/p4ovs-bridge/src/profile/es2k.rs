//! Entry builders and orchestration for the ES2K hardware pipeline.
//!
//! The ES2K table set is bridge-aware: forwarding tables carry bridge-id
//! and smac-learned keys next to the destination MAC, tunnels get
//! separate encap/decap mod tables with VLAN pop/push variants, and MACs
//! learned over a tunnel are mirrored into `l2_to_tunnel_v4/v6` so the
//! delete path can tell tunnel-backed entries from VLAN-backed ones.

use crate::error::{BuildError, ProgramError};
use crate::profile::{PipelineProfile, ProgramContext, TxnLog};
use crate::reconcile::{self, TunnelTableClass};
use crate::tables::es2k::*;
use async_trait::async_trait;
use p4ovs_p4rt::codec::{encode_ipv4, encode_ipv6, encode_mac, encode_uint};
use p4ovs_p4rt::{EntryOp, PipelineSchema, TableEntry};
use p4ovs_types::{MacLearningInfo, PortVlanMode, SrcPortInfo, TunnelInfo};
use std::net::IpAddr;
use tracing::debug;

/// ES2K hardware pipeline profile.
pub struct Es2kProfile;

const PROFILE_NAME: &str = "es2k";

/// UDP port fields in the encap actions are consumed byte-swapped by
/// the pipeline.
fn encode_udp_port_swapped(port: u16) -> Vec<u8> {
    vec![(port & 0xff) as u8, (port >> 8) as u8]
}

/// The encap source-port field additionally carries the byte-swapped
/// value doubled; the pipeline shifts it back out when hashing.
fn encode_vxlan_src_port(port: u16) -> Vec<u8> {
    let doubled = port.swap_bytes().wrapping_mul(2);
    encode_uint(u64::from(doubled), 2)
}

fn tunnel_of(learn: &MacLearningInfo) -> Result<&TunnelInfo, BuildError> {
    learn.tunnel.as_ref().ok_or(BuildError::MissingTunnelInfo)
}

/// Appends the three forwarding-table keys shared by the TX and RX
/// tables: destination MAC, bridge id, smac-learned flag.
fn push_fwd_keys(
    entry: &mut TableEntry,
    schema: &PipelineSchema,
    table: &str,
    learn: &MacLearningInfo,
) -> Result<(), BuildError> {
    entry.match_exact(
        schema.match_field_id(table, FWD_KEY_DST_MAC)?,
        encode_mac(&learn.mac_addr),
    );
    entry.match_exact(
        schema.match_field_id(table, FWD_KEY_BRIDGE_ID)?,
        encode_uint(u64::from(learn.bridge_id), 1),
    );
    entry.match_exact(schema.match_field_id(table, FWD_KEY_SMAC_LEARNED)?, vec![1]);
    Ok(())
}

/// Source-MAC learning entry: ternary MAC with a full mask, priority 1.
pub fn fdb_smac_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_SMAC_TABLE)?);
    entry.priority = Some(1);
    entry.match_ternary(
        schema.match_field_id(L2_FWD_SMAC_TABLE, SMAC_KEY_SA)?,
        encode_mac(&learn.mac_addr),
        vec![0xff; 6],
    );

    if op.is_insert() {
        entry.set_action(schema.action_id(ACTION_SMAC_LEARN)?);
    }
    Ok(entry)
}

/// TX forwarding entry for a MAC learned on a plain or VLAN-backed port.
/// A native-untagged port needs the VLAN header removed on egress, so it
/// gets the `remove_vlan_and_fwd` variant.
pub fn fdb_tx_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_TX_TABLE)?);
    push_fwd_keys(&mut entry, schema, L2_FWD_TX_TABLE, learn)?;

    if op.is_insert() {
        if learn.vlan.mode == PortVlanMode::NativeUntagged {
            let action = entry.set_action(schema.action_id(ACTION_REMOVE_VLAN_AND_FWD)?);
            action.param(
                schema.param_id(ACTION_REMOVE_VLAN_AND_FWD, PARAM_PORT_ID)?,
                encode_uint(u64::from(learn.src_port), 1),
            );
            action.param(
                schema.param_id(ACTION_REMOVE_VLAN_AND_FWD, PARAM_VLAN_PTR)?,
                encode_uint(u64::from(learn.vlan.vlan_id), 1),
            );
        } else {
            let action = entry.set_action(schema.action_id(ACTION_L2_FWD)?);
            action.param(
                schema.param_id(ACTION_L2_FWD, PARAM_PORT)?,
                encode_uint(u64::from(learn.src_port), 1),
            );
        }
    }
    Ok(entry)
}

/// RX forwarding entry paired with [`fdb_tx_entry`].
pub fn fdb_rx_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_RX_TABLE)?);
    push_fwd_keys(&mut entry, schema, L2_FWD_RX_TABLE, learn)?;

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_L2_FWD)?);
        action.param(
            schema.param_id(ACTION_L2_FWD, PARAM_PORT)?,
            encode_uint(u64::from(learn.src_port), 1),
        );
    }
    Ok(entry)
}

/// TX forwarding entry steering a tunnel-learned MAC into the underlay,
/// choosing among the four address-family x VLAN-mode action variants.
pub fn fdb_tx_tunnel_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(L2_FWD_TX_TABLE)?);
    push_fwd_keys(&mut entry, schema, L2_FWD_TX_TABLE, learn)?;

    if op.is_insert() {
        let tunnel = tunnel_of(learn)?;
        let pop_vlan = learn.vlan.mode == PortVlanMode::NativeUntagged;
        let action_name = if tunnel.is_v4() {
            if pop_vlan {
                ACTION_POP_VLAN_SET_TUNNEL_UNDERLAY_V4
            } else {
                ACTION_SET_TUNNEL_UNDERLAY_V4
            }
        } else if tunnel.is_v6() {
            if pop_vlan {
                ACTION_POP_VLAN_SET_TUNNEL_UNDERLAY_V6
            } else {
                ACTION_SET_TUNNEL_UNDERLAY_V6
            }
        } else {
            return Err(BuildError::MixedAddressFamily);
        };

        let action = entry.set_action(schema.action_id(action_name)?);
        action.param(
            schema.param_id(action_name, PARAM_TUNNEL_ID)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
    }
    Ok(entry)
}

/// Tunnel-classification entry keyed on the learned MAC, one table per
/// address family. The insert action records the remote endpoint.
pub fn l2_to_tunnel_entry(
    schema: &PipelineSchema,
    learn: &MacLearningInfo,
    class: TunnelTableClass,
    op: EntryOp,
) -> Result<(&'static str, TableEntry), BuildError> {
    let table = match class {
        TunnelTableClass::V4 => L2_TO_TUNNEL_V4_TABLE,
        TunnelTableClass::V6 => L2_TO_TUNNEL_V6_TABLE,
    };
    let mut entry = TableEntry::new(schema.table_id(table)?);
    entry.match_exact(
        schema.match_field_id(table, L2_TO_TUNNEL_KEY_DA)?,
        encode_mac(&learn.mac_addr),
    );

    if op.is_insert() {
        let tunnel = tunnel_of(learn)?;
        match (class, tunnel.remote_ip) {
            (TunnelTableClass::V4, IpAddr::V4(remote)) => {
                let action = entry.set_action(schema.action_id(ACTION_SET_TUNNEL_V4)?);
                action.param(
                    schema.param_id(ACTION_SET_TUNNEL_V4, PARAM_DST_ADDR)?,
                    encode_ipv4(remote),
                );
            }
            (TunnelTableClass::V6, IpAddr::V6(remote)) => {
                let action = entry.set_action(schema.action_id(ACTION_SET_TUNNEL_V6)?);
                let octets = encode_ipv6(remote);
                for (param, chunk) in [PARAM_IPV6_1, PARAM_IPV6_2, PARAM_IPV6_3, PARAM_IPV6_4]
                    .iter()
                    .zip(octets.chunks(4))
                {
                    action.param(
                        schema.param_id(ACTION_SET_TUNNEL_V6, param)?,
                        chunk.to_vec(),
                    );
                }
            }
            _ => return Err(BuildError::MixedAddressFamily),
        }
    }
    Ok((table, entry))
}

fn encap_params(
    schema: &PipelineSchema,
    entry: &mut TableEntry,
    action_name: &str,
    tunnel: &TunnelInfo,
    src: Vec<u8>,
    dst: Vec<u8>,
) -> Result<(), BuildError> {
    let action = entry.set_action(schema.action_id(action_name)?);
    action.param(schema.param_id(action_name, PARAM_SRC_ADDR)?, src);
    action.param(schema.param_id(action_name, PARAM_DST_ADDR)?, dst);
    action.param(
        schema.param_id(action_name, PARAM_SRC_PORT)?,
        encode_vxlan_src_port(tunnel.dst_port),
    );
    action.param(
        schema.param_id(action_name, PARAM_DST_PORT)?,
        encode_udp_port_swapped(tunnel.dst_port),
    );
    action.param(
        schema.param_id(action_name, PARAM_VNI)?,
        encode_uint(u64::from(tunnel.vni), 1),
    );
    Ok(())
}

/// Encap-mod entry for the family/VLAN-mode variant the tunnel needs.
/// Returns the table name alongside the entry for failure reporting.
pub fn encap_entry(
    schema: &PipelineSchema,
    tunnel: &TunnelInfo,
    op: EntryOp,
) -> Result<(&'static str, TableEntry), BuildError> {
    let pop_vlan = tunnel.vlan.mode == PortVlanMode::NativeUntagged;
    let (table, action_name, src, dst) = match (tunnel.local_ip, tunnel.remote_ip) {
        (IpAddr::V4(local), IpAddr::V4(remote)) => {
            let (table, action) = if pop_vlan {
                (VXLAN_ENCAP_VLAN_POP_MOD_TABLE, ACTION_VXLAN_ENCAP_VLAN_POP)
            } else {
                (VXLAN_ENCAP_MOD_TABLE, ACTION_VXLAN_ENCAP)
            };
            (table, action, encode_ipv4(local), encode_ipv4(remote))
        }
        (IpAddr::V6(local), IpAddr::V6(remote)) => {
            let (table, action) = if pop_vlan {
                (
                    VXLAN_ENCAP_V6_VLAN_POP_MOD_TABLE,
                    ACTION_VXLAN_ENCAP_V6_VLAN_POP,
                )
            } else {
                (VXLAN_ENCAP_V6_MOD_TABLE, ACTION_VXLAN_ENCAP_V6)
            };
            (table, action, encode_ipv6(local), encode_ipv6(remote))
        }
        _ => return Err(BuildError::MixedAddressFamily),
    };

    let mut entry = TableEntry::new(schema.table_id(table)?);
    entry.match_exact(
        schema.match_field_id(table, ENCAP_KEY_MOD_DATA_PTR)?,
        encode_uint(u64::from(tunnel.vni), 1),
    );
    if op.is_insert() {
        encap_params(schema, &mut entry, action_name, tunnel, src, dst)?;
    }
    Ok((table, entry))
}

/// Decap-mod entry. A native-untagged port gets the VLAN header pushed
/// back after decapsulation.
pub fn decap_entry(
    schema: &PipelineSchema,
    tunnel: &TunnelInfo,
    op: EntryOp,
) -> Result<(&'static str, TableEntry), BuildError> {
    if tunnel.vlan.mode == PortVlanMode::NativeTagged {
        let mut entry = TableEntry::new(schema.table_id(VXLAN_DECAP_MOD_TABLE)?);
        entry.match_exact(
            schema.match_field_id(VXLAN_DECAP_MOD_TABLE, DECAP_KEY_MOD_BLOB_PTR)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
        if op.is_insert() {
            entry.set_action(schema.action_id(ACTION_VXLAN_DECAP_OUTER_HDR)?);
        }
        Ok((VXLAN_DECAP_MOD_TABLE, entry))
    } else {
        let mut entry = TableEntry::new(schema.table_id(VXLAN_DECAP_VLAN_PUSH_MOD_TABLE)?);
        entry.match_exact(
            schema.match_field_id(VXLAN_DECAP_VLAN_PUSH_MOD_TABLE, DECAP_KEY_MOD_BLOB_PTR)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
        if op.is_insert() {
            let action = entry.set_action(schema.action_id(ACTION_VXLAN_DECAP_AND_PUSH_VLAN)?);
            action.param(
                schema.param_id(ACTION_VXLAN_DECAP_AND_PUSH_VLAN, PARAM_PCP)?,
                vec![1],
            );
            action.param(
                schema.param_id(ACTION_VXLAN_DECAP_AND_PUSH_VLAN, PARAM_DEI)?,
                vec![0],
            );
            action.param(
                schema.param_id(ACTION_VXLAN_DECAP_AND_PUSH_VLAN, PARAM_VLAN_ID)?,
                encode_uint(u64::from(tunnel.vlan.vlan_id), 1),
            );
        }
        Ok((VXLAN_DECAP_VLAN_PUSH_MOD_TABLE, entry))
    }
}

/// Termination entry: bridge id, remote source address, and VNI keys;
/// decap (optionally pushing the VLAN back) on insert.
pub fn tunnel_term_entry(
    schema: &PipelineSchema,
    tunnel: &TunnelInfo,
    op: EntryOp,
) -> Result<(&'static str, TableEntry), BuildError> {
    let (table, src_key, src) = match tunnel.remote_ip {
        IpAddr::V4(remote) if tunnel.is_v4() => {
            (IPV4_TUNNEL_TERM_TABLE, TERM_KEY_IPV4_SRC, encode_ipv4(remote))
        }
        IpAddr::V6(remote) if tunnel.is_v6() => {
            (IPV6_TUNNEL_TERM_TABLE, TERM_KEY_IPV6_SRC, encode_ipv6(remote))
        }
        _ => return Err(BuildError::MixedAddressFamily),
    };

    let mut entry = TableEntry::new(schema.table_id(table)?);
    entry.match_exact(
        schema.match_field_id(table, TERM_KEY_BRIDGE_ID)?,
        encode_uint(u64::from(tunnel.bridge_id), 1),
    );
    entry.match_exact(schema.match_field_id(table, src_key)?, src);
    entry.match_exact(
        schema.match_field_id(table, TERM_KEY_VNI)?,
        encode_uint(u64::from(tunnel.vni), 1),
    );

    if op.is_insert() {
        let action_name = if tunnel.vlan.mode == PortVlanMode::NativeUntagged {
            ACTION_DECAP_OUTER_HDR_AND_PUSH_VLAN
        } else {
            ACTION_DECAP_OUTER_HDR
        };
        let action = entry.set_action(schema.action_id(action_name)?);
        action.param(
            schema.param_id(action_name, PARAM_TUNNEL_ID)?,
            encode_uint(u64::from(tunnel.vni), 1),
        );
    }
    Ok((table, entry))
}

/// Receive-side tunnel source-port entry keyed on VNI and remote source.
pub fn rx_tunnel_src_port_entry(
    schema: &PipelineSchema,
    tunnel: &TunnelInfo,
    op: EntryOp,
) -> Result<(&'static str, TableEntry), BuildError> {
    let (table, src_key, src, port_width) = match tunnel.remote_ip {
        IpAddr::V4(remote) if tunnel.is_v4() => (
            RX_IPV4_TUNNEL_SOURCE_PORT_TABLE,
            RX_TUNNEL_KEY_IPV4_SRC,
            encode_ipv4(remote),
            2,
        ),
        // The v6 table declares a narrower source-port field.
        IpAddr::V6(remote) if tunnel.is_v6() => (
            RX_IPV6_TUNNEL_SOURCE_PORT_TABLE,
            RX_TUNNEL_KEY_IPV6_SRC,
            encode_ipv6(remote),
            1,
        ),
        _ => return Err(BuildError::MixedAddressFamily),
    };

    let mut entry = TableEntry::new(schema.table_id(table)?);
    entry.match_exact(
        schema.match_field_id(table, RX_TUNNEL_KEY_VNI)?,
        encode_uint(u64::from(tunnel.vni), 1),
    );
    entry.match_exact(schema.match_field_id(table, src_key)?, src);

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_SET_SRC_PORT)?);
        action.param(
            schema.param_id(ACTION_SET_SRC_PORT, PARAM_SRC_PORT)?,
            encode_uint(u64::from(tunnel.src_port), port_width),
        );
    }
    Ok((table, entry))
}

/// Source-port to bridge mapping entry: ternary port and VID keys,
/// priority 1. The VID mask covers the 12 valid bits only.
pub fn src_port_to_bridge_entry(
    schema: &PipelineSchema,
    sp: &SrcPortInfo,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(SOURCE_PORT_TO_BRIDGE_MAP_TABLE)?);
    entry.priority = Some(1);
    entry.match_ternary(
        schema.match_field_id(SOURCE_PORT_TO_BRIDGE_MAP_TABLE, SRC_PORT_MAP_KEY_SRC_PORT)?,
        encode_uint(u64::from(sp.src_port), 2),
        vec![0xff, 0xff],
    );
    entry.match_ternary(
        schema.match_field_id(SOURCE_PORT_TO_BRIDGE_MAP_TABLE, SRC_PORT_MAP_KEY_VID)?,
        vec![((sp.vlan_id >> 8) & 0x0f) as u8, (sp.vlan_id & 0xff) as u8],
        vec![0x0f, 0xff],
    );

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_SET_BRIDGE_ID)?);
        action.param(
            schema.param_id(ACTION_SET_BRIDGE_ID, PARAM_BRIDGE_ID)?,
            encode_uint(u64::from(sp.bridge_id), 1),
        );
    }
    Ok(entry)
}

/// Read template for the VSI-to-physical-port mapping table. The vport
/// id in events is offset from the VSI key.
pub fn tx_acc_vsi_read_template(
    schema: &PipelineSchema,
    src_port: u32,
) -> Result<TableEntry, BuildError> {
    let vsi = src_port.wrapping_sub(VPORT_ID_OFFSET);
    let mut entry = TableEntry::new(schema.table_id(TX_ACC_VSI_TABLE)?);
    entry.match_exact(
        schema.match_field_id(TX_ACC_VSI_TABLE, TX_ACC_VSI_KEY_VSI)?,
        encode_uint(u64::from(vsi), 1),
    );
    Ok(entry)
}

/// VLAN push mod entry: fixed PCP/DEI, the VLAN id as both key and
/// action parameter.
pub fn vlan_push_entry(
    schema: &PipelineSchema,
    vlan_id: u16,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(VLAN_PUSH_MOD_TABLE)?);
    entry.match_exact(
        schema.match_field_id(VLAN_PUSH_MOD_TABLE, VLAN_MOD_KEY_MOD_BLOB_PTR)?,
        encode_uint(u64::from(vlan_id), 1),
    );

    if op.is_insert() {
        let action = entry.set_action(schema.action_id(ACTION_VLAN_PUSH)?);
        action.param(schema.param_id(ACTION_VLAN_PUSH, PARAM_PCP)?, vec![1]);
        action.param(schema.param_id(ACTION_VLAN_PUSH, PARAM_DEI)?, vec![0]);
        action.param(
            schema.param_id(ACTION_VLAN_PUSH, PARAM_VLAN_ID)?,
            encode_uint(u64::from(vlan_id), 1),
        );
    }
    Ok(entry)
}

/// VLAN pop mod entry.
pub fn vlan_pop_entry(
    schema: &PipelineSchema,
    vlan_id: u16,
    op: EntryOp,
) -> Result<TableEntry, BuildError> {
    let mut entry = TableEntry::new(schema.table_id(VLAN_POP_MOD_TABLE)?);
    entry.match_exact(
        schema.match_field_id(VLAN_POP_MOD_TABLE, VLAN_MOD_KEY_MOD_BLOB_PTR)?,
        encode_uint(u64::from(vlan_id), 1),
    );

    if op.is_insert() {
        entry.set_action(schema.action_id(ACTION_VLAN_POP)?);
    }
    Ok(entry)
}

impl Es2kProfile {
    async fn program_fdb_tunnel(
        &self,
        ctx: &ProgramContext<'_>,
        learn: &MacLearningInfo,
        class: TunnelTableClass,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        if op.is_insert() {
            let template = fdb_tx_tunnel_entry(ctx.schema, learn, EntryOp::Delete)?;
            if reconcile::entry_exists(ctx, template).await? {
                debug!(mac = %learn.mac_addr, "tunnel fdb entry already programmed, skipping");
                return Ok(());
            }
        }

        let mut txn = TxnLog::new();
        let tx = fdb_tx_tunnel_entry(ctx.schema, learn, op)?;
        txn.write(ctx, L2_FWD_TX_TABLE, op, tx).await;

        let (table, entry) = l2_to_tunnel_entry(ctx.schema, learn, class, op)?;
        txn.write(ctx, table, op, entry).await;

        let smac = fdb_smac_entry(ctx.schema, learn, op)?;
        txn.write(ctx, L2_FWD_SMAC_TABLE, op, smac).await;
        txn.finish()
    }

    async fn program_fdb_plain(
        &self,
        ctx: &ProgramContext<'_>,
        learn: &MacLearningInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        let mut learn = learn.clone();
        if op.is_insert() {
            let template = fdb_tx_entry(ctx.schema, &learn, EntryOp::Delete)?;
            if reconcile::entry_exists(ctx, template).await? {
                debug!(mac = %learn.mac_addr, "fdb entry already programmed, skipping");
                return Ok(());
            }
            // The forwarding action must name the physical port that the
            // VSI mapping step programmed earlier, not the vport id the
            // event carries.
            learn.src_port = reconcile::recover_physical_port(ctx, learn.src_port).await?;
        }

        let mut txn = TxnLog::new();
        let tx = fdb_tx_entry(ctx.schema, &learn, op)?;
        txn.write(ctx, L2_FWD_TX_TABLE, op, tx).await;

        let rx = fdb_rx_entry(ctx.schema, &learn, op)?;
        txn.write(ctx, L2_FWD_RX_TABLE, op, rx).await;

        let smac = fdb_smac_entry(ctx.schema, &learn, op)?;
        txn.write(ctx, L2_FWD_SMAC_TABLE, op, smac).await;
        txn.finish()
    }
}

#[async_trait]
impl PipelineProfile for Es2kProfile {
    fn name(&self) -> &'static str {
        PROFILE_NAME
    }

    async fn program_fdb(
        &self,
        ctx: &ProgramContext<'_>,
        learn: &MacLearningInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        // The delete event alone cannot tell a tunnel-learned MAC from a
        // VLAN-learned one; the classification tables decide.
        let mut is_tunnel = learn.is_tunnel;
        let mut class = match learn.tunnel.as_ref() {
            Some(t) if t.is_v6() => TunnelTableClass::V6,
            _ => TunnelTableClass::V4,
        };
        if !op.is_insert() {
            if let Some(found) = reconcile::classify_tunnel_fdb(ctx, learn).await? {
                is_tunnel = true;
                class = found;
            }
        }

        if is_tunnel {
            self.program_fdb_tunnel(ctx, learn, class, op).await
        } else {
            self.program_fdb_plain(ctx, learn, op).await
        }
    }

    async fn program_tunnel(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        // Mod tables before termination so a partially-programmed tunnel
        // never terminates traffic it cannot re-encapsulate.
        let (encap_table, encap) = encap_entry(ctx.schema, tunnel, op)?;
        let (decap_table, decap) = decap_entry(ctx.schema, tunnel, op)?;
        let (term_table, term) = tunnel_term_entry(ctx.schema, tunnel, op)?;

        let mut txn = TxnLog::new();
        txn.write(ctx, encap_table, op, encap).await;
        txn.write(ctx, decap_table, op, decap).await;
        txn.write(ctx, term_table, op, term).await;
        txn.finish()
    }

    async fn program_tunnel_term(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        let (table, entry) = tunnel_term_entry(ctx.schema, tunnel, op)?;
        let mut txn = TxnLog::new();
        txn.write(ctx, table, op, entry).await;
        txn.finish()
    }

    async fn program_rx_tunnel_src_port(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        let (table, entry) = rx_tunnel_src_port_entry(ctx.schema, tunnel, op)?;
        let mut txn = TxnLog::new();
        txn.write(ctx, table, op, entry).await;
        txn.finish()
    }

    async fn program_vlan(
        &self,
        ctx: &ProgramContext<'_>,
        vlan_id: u16,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        let push = vlan_push_entry(ctx.schema, vlan_id, op)?;
        let pop = vlan_pop_entry(ctx.schema, vlan_id, op)?;

        let mut txn = TxnLog::new();
        txn.write(ctx, VLAN_PUSH_MOD_TABLE, op, push).await;
        txn.write(ctx, VLAN_POP_MOD_TABLE, op, pop).await;
        txn.finish()
    }

    async fn program_tunnel_src_port(
        &self,
        ctx: &ProgramContext<'_>,
        sp: &SrcPortInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        let entry = src_port_to_bridge_entry(ctx.schema, sp, op)?;
        let mut txn = TxnLog::new();
        txn.write(ctx, SOURCE_PORT_TO_BRIDGE_MAP_TABLE, op, entry).await;
        txn.finish()
    }

    async fn program_vsi_src_port(
        &self,
        ctx: &ProgramContext<'_>,
        sp: &SrcPortInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        // The mapping must name the physical port paired with this VSI.
        let mut sp = *sp;
        sp.src_port = reconcile::recover_physical_port(ctx, sp.src_port).await?;

        let entry = src_port_to_bridge_entry(ctx.schema, &sp, op)?;
        let mut txn = TxnLog::new();
        txn.write(ctx, SOURCE_PORT_TO_BRIDGE_MAP_TABLE, op, entry).await;
        txn.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{es2k_schema, tunnel_learn_event, v4_tunnel_event, v6_tunnel_event};
    use p4ovs_p4rt::codec::decode_uint;
    use p4ovs_p4rt::MatchValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fwd_keys_in_schema_order() {
        let schema = es2k_schema();
        let learn = tunnel_learn_event();
        let entry = fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Insert).unwrap();

        let declared: Vec<u32> = schema
            .tables
            .iter()
            .find(|t| t.name == L2_FWD_TX_TABLE)
            .unwrap()
            .match_fields
            .iter()
            .map(|mf| mf.id)
            .collect();
        let built: Vec<u32> = entry.matches.iter().map(|m| m.field_id).collect();
        assert_eq!(built, declared);
    }

    #[test]
    fn test_smac_entry_is_ternary_with_priority() {
        let schema = es2k_schema();
        let learn = tunnel_learn_event();
        let entry = fdb_smac_entry(&schema, &learn, EntryOp::Insert).unwrap();
        assert_eq!(entry.priority, Some(1));
        assert!(matches!(
            entry.matches[0].value,
            MatchValue::Ternary { ref mask, .. } if mask == &vec![0xff; 6]
        ));
    }

    #[test]
    fn test_tunnel_action_variant_selection() {
        let schema = es2k_schema();
        let mut learn = tunnel_learn_event();

        learn.vlan.mode = PortVlanMode::NativeUntagged;
        let popped = fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Insert).unwrap();
        learn.vlan.mode = PortVlanMode::NativeTagged;
        let kept = fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Insert).unwrap();

        assert_ne!(
            popped.action.as_ref().unwrap().action_id,
            kept.action.as_ref().unwrap().action_id
        );
    }

    #[test]
    fn test_tunnel_entry_missing_tunnel_info() {
        let schema = es2k_schema();
        let mut learn = tunnel_learn_event();
        learn.tunnel = None;
        assert_eq!(
            fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Insert).unwrap_err(),
            BuildError::MissingTunnelInfo
        );
        // Deletes are match-only and need no tunnel linkage.
        assert!(fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Delete).is_ok());
    }

    #[test]
    fn test_encap_variant_and_params_decode() {
        let schema = es2k_schema();
        let tunnel = v4_tunnel_event();
        let (table, entry) = encap_entry(&schema, &tunnel, EntryOp::Insert).unwrap();
        assert_eq!(table, VXLAN_ENCAP_MOD_TABLE);

        let action = entry.action.as_ref().unwrap();
        assert_eq!(action.params[0].value, vec![10, 0, 0, 1]);
        assert_eq!(action.params[1].value, vec![10, 0, 0, 2]);
        assert_eq!(decode_uint(&action.params[4].value).unwrap(), 100);
    }

    #[test]
    fn test_encap_src_port_swapped_and_doubled() {
        let schema = es2k_schema();
        let tunnel = v4_tunnel_event();
        let (_, entry) = encap_entry(&schema, &tunnel, EntryOp::Insert).unwrap();
        let action = entry.action.as_ref().unwrap();
        // 4789 = 0x12b5; swapped 0xb512, doubled 0x6a24.
        assert_eq!(action.params[2].value, vec![0x6a, 0x24]);
        assert_eq!(action.params[3].value, vec![0xb5, 0x12]);
    }

    #[test]
    fn test_encap_vlan_pop_variant() {
        let schema = es2k_schema();
        let mut tunnel = v4_tunnel_event();
        tunnel.vlan.mode = PortVlanMode::NativeUntagged;
        let (table, _) = encap_entry(&schema, &tunnel, EntryOp::Insert).unwrap();
        assert_eq!(table, VXLAN_ENCAP_VLAN_POP_MOD_TABLE);
    }

    #[test]
    fn test_v6_term_entry() {
        let schema = es2k_schema();
        let tunnel = v6_tunnel_event();
        let (table, entry) = tunnel_term_entry(&schema, &tunnel, EntryOp::Insert).unwrap();
        assert_eq!(table, IPV6_TUNNEL_TERM_TABLE);
        assert_eq!(entry.matches.len(), 3);
    }

    #[test]
    fn test_mixed_family_is_rejected_everywhere() {
        let schema = es2k_schema();
        let mut tunnel = v4_tunnel_event();
        tunnel.remote_ip = "2001:db8::2".parse().unwrap();

        assert_eq!(
            encap_entry(&schema, &tunnel, EntryOp::Insert).unwrap_err(),
            BuildError::MixedAddressFamily
        );
        assert_eq!(
            tunnel_term_entry(&schema, &tunnel, EntryOp::Insert).unwrap_err(),
            BuildError::MixedAddressFamily
        );
        assert_eq!(
            rx_tunnel_src_port_entry(&schema, &tunnel, EntryOp::Insert).unwrap_err(),
            BuildError::MixedAddressFamily
        );
    }

    #[test]
    fn test_l2_to_tunnel_v6_splits_address_into_words() {
        let schema = es2k_schema();
        let mut learn = tunnel_learn_event();
        learn.tunnel = Some(v6_tunnel_event());
        let (table, entry) =
            l2_to_tunnel_entry(&schema, &learn, TunnelTableClass::V6, EntryOp::Insert).unwrap();
        assert_eq!(table, L2_TO_TUNNEL_V6_TABLE);

        let action = entry.action.as_ref().unwrap();
        assert_eq!(action.params.len(), 4);
        let remote = match v6_tunnel_event().remote_ip {
            IpAddr::V6(a) => a.octets(),
            _ => unreachable!(),
        };
        let rebuilt: Vec<u8> = action
            .params
            .iter()
            .flat_map(|p| p.value.clone())
            .collect();
        assert_eq!(rebuilt, remote.to_vec());
    }

    #[test]
    fn test_src_port_map_vid_mask() {
        let schema = es2k_schema();
        let sp = SrcPortInfo {
            src_port: 0x1234,
            vlan_id: 0x0abc,
            bridge_id: 7,
        };
        let entry = src_port_to_bridge_entry(&schema, &sp, EntryOp::Insert).unwrap();
        assert_eq!(entry.priority, Some(1));
        match &entry.matches[1].value {
            MatchValue::Ternary { value, mask } => {
                assert_eq!(value, &vec![0x0a, 0xbc]);
                assert_eq!(mask, &vec![0x0f, 0xff]);
            }
            other => panic!("expected ternary vid match, got {:?}", other),
        }
    }

    #[test]
    fn test_vsi_read_template_applies_offset() {
        let schema = es2k_schema();
        let entry = tx_acc_vsi_read_template(&schema, 20).unwrap();
        assert_eq!(entry.matches[0].value, MatchValue::Exact(vec![4]));
        assert!(entry.action.is_none());
    }

    #[test]
    fn test_vlan_push_params() {
        let schema = es2k_schema();
        let entry = vlan_push_entry(&schema, 42, EntryOp::Insert).unwrap();
        let action = entry.action.as_ref().unwrap();
        assert_eq!(action.params[0].value, vec![1]); // pcp
        assert_eq!(action.params[1].value, vec![0]); // dei
        assert_eq!(action.params[2].value, vec![42]);
    }

    #[test]
    fn test_builders_are_pure() {
        let schema = es2k_schema();
        let tunnel = v4_tunnel_event();
        let a = encap_entry(&schema, &tunnel, EntryOp::Insert).unwrap();
        let b = encap_entry(&schema, &tunnel, EntryOp::Insert).unwrap();
        assert_eq!(a, b);

        let learn = tunnel_learn_event();
        let x = fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Insert).unwrap();
        let y = fdb_tx_tunnel_entry(&schema, &learn, EntryOp::Insert).unwrap();
        assert_eq!(x, y);
    }
}
