//! P4 object names per target profile.
//!
//! These are the symbolic names resolved against the pipeline schema at
//! build time. The two supported pipelines share a control-block prefix
//! but expose different table topologies and action sets.

/// Names for the DPDK software pipeline.
pub mod dpdk {
    pub const L2_FWD_TX_TABLE: &str = "linux_networking_control.l2_fwd_tx_table";
    pub const L2_FWD_TX_KEY_DST_MAC: &str = "dst_mac";
    pub const ACTION_L2_FWD: &str = "linux_networking_control.l2_fwd";
    pub const PARAM_PORT: &str = "port";
    pub const ACTION_SET_TUNNEL: &str = "linux_networking_control.set_tunnel";
    pub const PARAM_TUNNEL_ID: &str = "tunnel_id";
    pub const PARAM_DST_ADDR: &str = "dst_addr";

    pub const L2_FWD_RX_WITH_TUNNEL_TABLE: &str =
        "linux_networking_control.l2_fwd_rx_with_tunnel_table";
    pub const L2_FWD_RX_KEY_DST_MAC: &str = "dst_mac";

    pub const VXLAN_ENCAP_MOD_TABLE: &str = "linux_networking_control.vxlan_encap_mod_table";
    pub const ENCAP_KEY_MOD_DATA_PTR: &str = "vendormeta_mod_data_ptr";
    pub const ACTION_VXLAN_ENCAP: &str = "linux_networking_control.vxlan_encap";
    pub const PARAM_SRC_ADDR: &str = "src_addr";
    pub const PARAM_DST_PORT: &str = "dst_port";
    pub const PARAM_VNI: &str = "vni";

    pub const IPV4_TUNNEL_TERM_TABLE: &str = "linux_networking_control.ipv4_tunnel_term_table";
    pub const TERM_KEY_TUNNEL_TYPE: &str = "tunnel_type";
    pub const TERM_KEY_IPV4_SRC: &str = "ipv4_src";
    pub const TERM_KEY_IPV4_DST: &str = "ipv4_dst";
    pub const ACTION_DECAP_OUTER_IPV4: &str = "linux_networking_control.decap_outer_ipv4";

    /// Tunnel-type selector value for VXLAN in the term table key.
    pub const TUNNEL_TYPE_VXLAN: u8 = 2;
}

/// Names for the ES2K hardware pipeline.
pub mod es2k {
    pub const L2_FWD_TX_TABLE: &str = "linux_networking_control.l2_fwd_tx_table";
    pub const L2_FWD_RX_TABLE: &str = "linux_networking_control.l2_fwd_rx_table";
    pub const FWD_KEY_DST_MAC: &str = "dst_mac";
    pub const FWD_KEY_BRIDGE_ID: &str = "bridge_id";
    pub const FWD_KEY_SMAC_LEARNED: &str = "smac_learned";
    pub const ACTION_L2_FWD: &str = "linux_networking_control.l2_fwd";
    pub const PARAM_PORT: &str = "port";
    pub const ACTION_REMOVE_VLAN_AND_FWD: &str = "linux_networking_control.remove_vlan_and_fwd";
    pub const PARAM_PORT_ID: &str = "port_id";
    pub const PARAM_VLAN_PTR: &str = "vlan_ptr";
    pub const ACTION_SET_TUNNEL_UNDERLAY_V4: &str =
        "linux_networking_control.set_tunnel_underlay_v4";
    pub const ACTION_POP_VLAN_SET_TUNNEL_UNDERLAY_V4: &str =
        "linux_networking_control.pop_vlan_set_tunnel_underlay_v4";
    pub const ACTION_SET_TUNNEL_UNDERLAY_V6: &str =
        "linux_networking_control.set_tunnel_underlay_v6";
    pub const ACTION_POP_VLAN_SET_TUNNEL_UNDERLAY_V6: &str =
        "linux_networking_control.pop_vlan_set_tunnel_underlay_v6";
    pub const PARAM_TUNNEL_ID: &str = "tunnel_id";

    pub const L2_FWD_SMAC_TABLE: &str = "linux_networking_control.l2_fwd_smac_table";
    pub const SMAC_KEY_SA: &str = "sa";
    pub const ACTION_SMAC_LEARN: &str = "linux_networking_control.smac_learn";

    pub const L2_TO_TUNNEL_V4_TABLE: &str = "linux_networking_control.l2_to_tunnel_v4_table";
    pub const L2_TO_TUNNEL_V6_TABLE: &str = "linux_networking_control.l2_to_tunnel_v6_table";
    pub const L2_TO_TUNNEL_KEY_DA: &str = "da";
    pub const ACTION_SET_TUNNEL_V4: &str = "linux_networking_control.set_tunnel_v4";
    pub const PARAM_DST_ADDR: &str = "dst_addr";
    pub const ACTION_SET_TUNNEL_V6: &str = "linux_networking_control.set_tunnel_v6";
    pub const PARAM_IPV6_1: &str = "ipv6_1";
    pub const PARAM_IPV6_2: &str = "ipv6_2";
    pub const PARAM_IPV6_3: &str = "ipv6_3";
    pub const PARAM_IPV6_4: &str = "ipv6_4";

    pub const VXLAN_ENCAP_MOD_TABLE: &str = "linux_networking_control.vxlan_encap_mod_table";
    pub const VXLAN_ENCAP_V6_MOD_TABLE: &str =
        "linux_networking_control.vxlan_encap_v6_mod_table";
    pub const VXLAN_ENCAP_VLAN_POP_MOD_TABLE: &str =
        "linux_networking_control.vxlan_encap_vlan_pop_mod_table";
    pub const VXLAN_ENCAP_V6_VLAN_POP_MOD_TABLE: &str =
        "linux_networking_control.vxlan_encap_v6_vlan_pop_mod_table";
    pub const ENCAP_KEY_MOD_DATA_PTR: &str = "vendormeta_mod_data_ptr";
    pub const ACTION_VXLAN_ENCAP: &str = "linux_networking_control.vxlan_encap";
    pub const ACTION_VXLAN_ENCAP_V6: &str = "linux_networking_control.vxlan_encap_v6";
    pub const ACTION_VXLAN_ENCAP_VLAN_POP: &str =
        "linux_networking_control.vxlan_encap_vlan_pop";
    pub const ACTION_VXLAN_ENCAP_V6_VLAN_POP: &str =
        "linux_networking_control.vxlan_encap_v6_vlan_pop";
    pub const PARAM_SRC_ADDR: &str = "src_addr";
    pub const PARAM_SRC_PORT: &str = "src_port";
    pub const PARAM_DST_PORT: &str = "dst_port";
    pub const PARAM_VNI: &str = "vni";

    pub const VXLAN_DECAP_MOD_TABLE: &str = "linux_networking_control.vxlan_decap_mod_table";
    pub const VXLAN_DECAP_VLAN_PUSH_MOD_TABLE: &str =
        "linux_networking_control.vxlan_decap_and_vlan_push_mod_table";
    pub const DECAP_KEY_MOD_BLOB_PTR: &str = "mod_blob_ptr";
    pub const ACTION_VXLAN_DECAP_OUTER_HDR: &str =
        "linux_networking_control.vxlan_decap_outer_hdr";
    pub const ACTION_VXLAN_DECAP_AND_PUSH_VLAN: &str =
        "linux_networking_control.vxlan_decap_and_push_vlan";
    pub const PARAM_PCP: &str = "pcp";
    pub const PARAM_DEI: &str = "dei";
    pub const PARAM_VLAN_ID: &str = "vlan_id";

    pub const IPV4_TUNNEL_TERM_TABLE: &str = "linux_networking_control.ipv4_tunnel_term_table";
    pub const IPV6_TUNNEL_TERM_TABLE: &str = "linux_networking_control.ipv6_tunnel_term_table";
    pub const TERM_KEY_BRIDGE_ID: &str = "bridge_id";
    pub const TERM_KEY_IPV4_SRC: &str = "ipv4_src";
    pub const TERM_KEY_IPV6_SRC: &str = "ipv6_src";
    pub const TERM_KEY_VNI: &str = "vni";
    pub const ACTION_DECAP_OUTER_HDR: &str = "linux_networking_control.decap_outer_hdr";
    pub const ACTION_DECAP_OUTER_HDR_AND_PUSH_VLAN: &str =
        "linux_networking_control.decap_outer_hdr_and_push_vlan";

    pub const RX_IPV4_TUNNEL_SOURCE_PORT_TABLE: &str =
        "linux_networking_control.rx_ipv4_tunnel_source_port_table";
    pub const RX_IPV6_TUNNEL_SOURCE_PORT_TABLE: &str =
        "linux_networking_control.rx_ipv6_tunnel_source_port_table";
    pub const RX_TUNNEL_KEY_VNI: &str = "vni";
    pub const RX_TUNNEL_KEY_IPV4_SRC: &str = "ipv4_src";
    pub const RX_TUNNEL_KEY_IPV6_SRC: &str = "ipv6_src";
    pub const ACTION_SET_SRC_PORT: &str = "linux_networking_control.set_src_port";

    pub const SOURCE_PORT_TO_BRIDGE_MAP_TABLE: &str =
        "linux_networking_control.source_port_to_bridge_map_table";
    pub const SRC_PORT_MAP_KEY_SRC_PORT: &str = "source_port";
    pub const SRC_PORT_MAP_KEY_VID: &str = "vid";
    pub const ACTION_SET_BRIDGE_ID: &str = "linux_networking_control.set_bridge_id";
    pub const PARAM_BRIDGE_ID: &str = "bridge_id";

    pub const TX_ACC_VSI_TABLE: &str = "linux_networking_control.tx_acc_vsi_table";
    pub const TX_ACC_VSI_KEY_VSI: &str = "vsi";
    pub const ACTION_L2_FWD_AND_BYPASS_BRIDGE: &str =
        "linux_networking_control.l2_fwd_and_bypass_bridge";

    pub const VLAN_PUSH_MOD_TABLE: &str = "linux_networking_control.vlan_push_mod_table";
    pub const VLAN_POP_MOD_TABLE: &str = "linux_networking_control.vlan_pop_mod_table";
    pub const VLAN_MOD_KEY_MOD_BLOB_PTR: &str = "mod_blob_ptr";
    pub const ACTION_VLAN_PUSH: &str = "linux_networking_control.vlan_push";
    pub const ACTION_VLAN_POP: &str = "linux_networking_control.vlan_pop";

    /// Offset between the vport id carried in events and the VSI key of
    /// `tx_acc_vsi_table`.
    pub const VPORT_ID_OFFSET: u32 = 16;
}
