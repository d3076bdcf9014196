//! Test doubles and fixtures shared by unit and integration tests.
//!
//! [`MockSession`] records every write and read issued through it and
//! replays canned read responses keyed by table id, so tests can assert
//! on the exact entries a scenario produced without a device.

use crate::tables;
use async_trait::async_trait;
use p4ovs_p4rt::{
    ActionParamSchema, ActionSchema, MatchFieldSchema, MatchKind, P4rtSession, PipelineSchema,
    SessionError, TableEntry, TableSchema, WriteRequest,
};
use p4ovs_types::{MacLearningInfo, PortVlanMode, TunnelInfo, VlanInfo};
use std::collections::HashMap;
use std::sync::Mutex;

fn table(name: &str, id: u32, fields: &[(&str, MatchKind)]) -> TableSchema {
    TableSchema {
        name: name.to_string(),
        id,
        match_fields: fields
            .iter()
            .enumerate()
            .map(|(i, (field, kind))| MatchFieldSchema {
                name: field.to_string(),
                id: (i + 1) as u32,
                kind: *kind,
            })
            .collect(),
    }
}

fn action(name: &str, id: u32, params: &[&str]) -> ActionSchema {
    ActionSchema {
        name: name.to_string(),
        id,
        params: params
            .iter()
            .enumerate()
            .map(|(i, param)| ActionParamSchema {
                name: param.to_string(),
                id: (i + 1) as u32,
            })
            .collect(),
    }
}

/// Schema fixture mirroring the DPDK pipeline's table set.
pub fn dpdk_schema() -> PipelineSchema {
    use tables::dpdk::*;
    let e = MatchKind::Exact;
    PipelineSchema {
        tables: vec![
            table(L2_FWD_TX_TABLE, 40001, &[("dst_mac", e)]),
            table(L2_FWD_RX_WITH_TUNNEL_TABLE, 40002, &[("dst_mac", e)]),
            table(VXLAN_ENCAP_MOD_TABLE, 40003, &[("vendormeta_mod_data_ptr", e)]),
            table(
                IPV4_TUNNEL_TERM_TABLE,
                40004,
                &[("ipv4_src", e), ("ipv4_dst", e), ("tunnel_type", e)],
            ),
        ],
        actions: vec![
            action(ACTION_L2_FWD, 20001, &["port"]),
            action(ACTION_SET_TUNNEL, 20002, &["tunnel_id", "dst_addr"]),
            action(
                ACTION_VXLAN_ENCAP,
                20003,
                &["src_addr", "dst_addr", "dst_port", "vni"],
            ),
            action(ACTION_DECAP_OUTER_IPV4, 20004, &["tunnel_id"]),
        ],
    }
}

/// Schema fixture mirroring the ES2K pipeline's table set.
pub fn es2k_schema() -> PipelineSchema {
    use tables::es2k::*;
    let e = MatchKind::Exact;
    let t = MatchKind::Ternary;
    let fwd_keys = [("dst_mac", e), ("bridge_id", e), ("smac_learned", e)];
    let encap_params = ["src_addr", "dst_addr", "src_port", "dst_port", "vni"];
    PipelineSchema {
        tables: vec![
            table(L2_FWD_TX_TABLE, 40101, &fwd_keys),
            table(L2_FWD_RX_TABLE, 40102, &fwd_keys),
            table(L2_FWD_SMAC_TABLE, 40103, &[("sa", t)]),
            table(L2_TO_TUNNEL_V4_TABLE, 40104, &[("da", e)]),
            table(L2_TO_TUNNEL_V6_TABLE, 40105, &[("da", e)]),
            table(VXLAN_ENCAP_MOD_TABLE, 40106, &[("vendormeta_mod_data_ptr", e)]),
            table(VXLAN_ENCAP_V6_MOD_TABLE, 40107, &[("vendormeta_mod_data_ptr", e)]),
            table(
                VXLAN_ENCAP_VLAN_POP_MOD_TABLE,
                40108,
                &[("vendormeta_mod_data_ptr", e)],
            ),
            table(
                VXLAN_ENCAP_V6_VLAN_POP_MOD_TABLE,
                40109,
                &[("vendormeta_mod_data_ptr", e)],
            ),
            table(VXLAN_DECAP_MOD_TABLE, 40110, &[("mod_blob_ptr", e)]),
            table(VXLAN_DECAP_VLAN_PUSH_MOD_TABLE, 40111, &[("mod_blob_ptr", e)]),
            table(
                IPV4_TUNNEL_TERM_TABLE,
                40112,
                &[("bridge_id", e), ("ipv4_src", e), ("vni", e)],
            ),
            table(
                IPV6_TUNNEL_TERM_TABLE,
                40113,
                &[("bridge_id", e), ("ipv6_src", e), ("vni", e)],
            ),
            table(
                RX_IPV4_TUNNEL_SOURCE_PORT_TABLE,
                40114,
                &[("vni", e), ("ipv4_src", e)],
            ),
            table(
                RX_IPV6_TUNNEL_SOURCE_PORT_TABLE,
                40115,
                &[("vni", e), ("ipv6_src", e)],
            ),
            table(
                SOURCE_PORT_TO_BRIDGE_MAP_TABLE,
                40116,
                &[("source_port", t), ("vid", t)],
            ),
            table(TX_ACC_VSI_TABLE, 40117, &[("vsi", e)]),
            table(VLAN_PUSH_MOD_TABLE, 40118, &[("mod_blob_ptr", e)]),
            table(VLAN_POP_MOD_TABLE, 40119, &[("mod_blob_ptr", e)]),
        ],
        actions: vec![
            action(ACTION_L2_FWD, 20101, &["port"]),
            action(ACTION_REMOVE_VLAN_AND_FWD, 20102, &["port_id", "vlan_ptr"]),
            action(ACTION_SET_TUNNEL_UNDERLAY_V4, 20103, &["tunnel_id"]),
            action(ACTION_POP_VLAN_SET_TUNNEL_UNDERLAY_V4, 20104, &["tunnel_id"]),
            action(ACTION_SET_TUNNEL_UNDERLAY_V6, 20105, &["tunnel_id"]),
            action(ACTION_POP_VLAN_SET_TUNNEL_UNDERLAY_V6, 20106, &["tunnel_id"]),
            action(ACTION_SMAC_LEARN, 20107, &[]),
            action(ACTION_SET_TUNNEL_V4, 20108, &["dst_addr"]),
            action(
                ACTION_SET_TUNNEL_V6,
                20109,
                &["ipv6_1", "ipv6_2", "ipv6_3", "ipv6_4"],
            ),
            action(ACTION_VXLAN_ENCAP, 20110, &encap_params),
            action(ACTION_VXLAN_ENCAP_V6, 20111, &encap_params),
            action(ACTION_VXLAN_ENCAP_VLAN_POP, 20112, &encap_params),
            action(ACTION_VXLAN_ENCAP_V6_VLAN_POP, 20113, &encap_params),
            action(ACTION_VXLAN_DECAP_OUTER_HDR, 20114, &[]),
            action(
                ACTION_VXLAN_DECAP_AND_PUSH_VLAN,
                20115,
                &["pcp", "dei", "vlan_id"],
            ),
            action(ACTION_DECAP_OUTER_HDR, 20116, &["tunnel_id"]),
            action(ACTION_DECAP_OUTER_HDR_AND_PUSH_VLAN, 20117, &["tunnel_id"]),
            action(ACTION_SET_SRC_PORT, 20118, &["src_port"]),
            action(ACTION_SET_BRIDGE_ID, 20119, &["bridge_id"]),
            action(ACTION_L2_FWD_AND_BYPASS_BRIDGE, 20120, &["port"]),
            action(ACTION_VLAN_PUSH, 20121, &["pcp", "dei", "vlan_id"]),
            action(ACTION_VLAN_POP, 20122, &[]),
        ],
    }
}

/// A MAC learned on a plain (untagged, untunneled) port.
pub fn plain_learn_event() -> MacLearningInfo {
    MacLearningInfo {
        mac_addr: "00:11:22:33:44:55".parse().unwrap(),
        src_port: 2,
        bridge_id: 0,
        is_tunnel: false,
        is_vlan: false,
        vlan: VlanInfo::default(),
        tunnel: None,
    }
}

/// A MAC learned over the fixture tunnel of [`v4_tunnel_event`].
pub fn tunnel_learn_event() -> MacLearningInfo {
    MacLearningInfo {
        mac_addr: "00:aa:bb:cc:dd:ee".parse().unwrap(),
        src_port: 20,
        bridge_id: 1,
        is_tunnel: true,
        is_vlan: false,
        vlan: VlanInfo::new(PortVlanMode::NativeTagged, 100),
        tunnel: Some(v4_tunnel_event()),
    }
}

/// A standard IPv4 VXLAN tunnel on the well-known port.
pub fn v4_tunnel_event() -> TunnelInfo {
    TunnelInfo {
        local_ip: "10.0.0.1".parse().unwrap(),
        remote_ip: "10.0.0.2".parse().unwrap(),
        vni: 100,
        src_port: 2,
        dst_port: 4789,
        bridge_id: 1,
        vlan: VlanInfo::new(PortVlanMode::NativeTagged, 100),
    }
}

/// An IPv6-underlay counterpart of [`v4_tunnel_event`].
pub fn v6_tunnel_event() -> TunnelInfo {
    TunnelInfo {
        local_ip: "2001:db8::1".parse().unwrap(),
        remote_ip: "2001:db8::2".parse().unwrap(),
        vni: 200,
        src_port: 2,
        dst_port: 4789,
        bridge_id: 1,
        vlan: VlanInfo::new(PortVlanMode::NativeTagged, 100),
    }
}

/// In-memory session double. Writes and read templates are recorded in
/// issue order; reads answer from per-table stubs and default to empty.
#[derive(Default)]
pub struct MockSession {
    schema: PipelineSchema,
    writes: Mutex<Vec<WriteRequest>>,
    reads: Mutex<Vec<TableEntry>>,
    read_stubs: Mutex<HashMap<u32, Vec<TableEntry>>>,
    write_failures: Mutex<HashMap<u32, SessionError>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose `pipeline_schema` call returns `schema`.
    pub fn with_schema(schema: PipelineSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Answers subsequent reads against `table_id` with `entries`.
    pub fn stub_read(&self, table_id: u32, entries: Vec<TableEntry>) {
        self.read_stubs.lock().unwrap().insert(table_id, entries);
    }

    /// Fails subsequent writes against `table_id` with `error`.
    pub fn fail_writes_to(&self, table_id: u32, error: SessionError) {
        self.write_failures.lock().unwrap().insert(table_id, error);
    }

    /// Every write issued so far, in order.
    pub fn writes(&self) -> Vec<WriteRequest> {
        self.writes.lock().unwrap().clone()
    }

    /// Every read template issued so far, in order.
    pub fn reads(&self) -> Vec<TableEntry> {
        self.reads.lock().unwrap().clone()
    }

    /// Table ids of the writes issued so far, in order.
    pub fn written_table_ids(&self) -> Vec<u32> {
        self.writes().iter().map(|w| w.entry.table_id).collect()
    }
}

#[async_trait]
impl P4rtSession for MockSession {
    async fn pipeline_schema(&self) -> Result<PipelineSchema, SessionError> {
        Ok(self.schema.clone())
    }

    async fn write(&self, request: WriteRequest) -> Result<(), SessionError> {
        let failure = self
            .write_failures
            .lock()
            .unwrap()
            .get(&request.entry.table_id)
            .cloned();
        self.writes.lock().unwrap().push(request);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn read(&self, template: TableEntry) -> Result<Vec<TableEntry>, SessionError> {
        let reply = self
            .read_stubs
            .lock()
            .unwrap()
            .get(&template.table_id)
            .cloned()
            .unwrap_or_default();
        self.reads.lock().unwrap().push(template);
        Ok(reply)
    }
}
