//! End-to-end scenarios through the bridge facade against a mock
//! session, asserting on the exact write sequences each event produces.

use p4ovs_bridge::tables::{dpdk, es2k};
use p4ovs_bridge::testing::{
    dpdk_schema, es2k_schema, plain_learn_event, tunnel_learn_event, v4_tunnel_event, MockSession,
};
use p4ovs_bridge::{BridgeConfig, BuildError, OvsBridge, ProfileKind, ProgramError};
use p4ovs_p4rt::codec::encode_uint;
use p4ovs_p4rt::{EntryOp, MatchValue, PipelineSchema, SessionError, TableEntry};
use p4ovs_types::SrcPortInfo;
use std::sync::Arc;

async fn es2k_bridge(session: Arc<MockSession>) -> OvsBridge {
    let config = BridgeConfig {
        device_id: 1,
        profile: ProfileKind::Es2k,
    };
    OvsBridge::connect(session, config).await.unwrap()
}

async fn dpdk_bridge(session: Arc<MockSession>) -> OvsBridge {
    let config = BridgeConfig {
        device_id: 1,
        profile: ProfileKind::Dpdk,
    };
    OvsBridge::connect(session, config).await.unwrap()
}

fn port_mapping_reply(schema: &PipelineSchema, port: u64) -> TableEntry {
    let mut entry = TableEntry::new(schema.table_id(es2k::TX_ACC_VSI_TABLE).unwrap());
    entry
        .set_action(
            schema
                .action_id(es2k::ACTION_L2_FWD_AND_BYPASS_BRIDGE)
                .unwrap(),
        )
        .param(
            schema
                .param_id(es2k::ACTION_L2_FWD_AND_BYPASS_BRIDGE, es2k::PARAM_PORT)
                .unwrap(),
            encode_uint(port, 4),
        );
    entry
}

#[tokio::test]
async fn plain_learn_programs_single_forwarding_entry_on_dpdk() {
    let schema = dpdk_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    let bridge = dpdk_bridge(session.clone()).await;

    bridge
        .program_fdb(&plain_learn_event(), EntryOp::Insert)
        .await
        .unwrap();

    let writes = session.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].op, EntryOp::Insert);
    assert_eq!(
        writes[0].entry.table_id,
        schema.table_id(dpdk::L2_FWD_TX_TABLE).unwrap()
    );
}

#[tokio::test]
async fn tunnel_learn_on_es2k_writes_three_tables_in_order() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    let bridge = es2k_bridge(session.clone()).await;

    bridge
        .program_fdb(&tunnel_learn_event(), EntryOp::Insert)
        .await
        .unwrap();

    assert_eq!(
        session.written_table_ids(),
        vec![
            schema.table_id(es2k::L2_FWD_TX_TABLE).unwrap(),
            schema.table_id(es2k::L2_TO_TUNNEL_V4_TABLE).unwrap(),
            schema.table_id(es2k::L2_FWD_SMAC_TABLE).unwrap(),
        ]
    );
}

#[tokio::test]
async fn repeated_fdb_insert_is_idempotent() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    let tx_table = schema.table_id(es2k::L2_FWD_TX_TABLE).unwrap();
    session.stub_read(tx_table, vec![TableEntry::new(tx_table)]);
    let bridge = es2k_bridge(session.clone()).await;

    bridge
        .program_fdb(&tunnel_learn_event(), EntryOp::Insert)
        .await
        .unwrap();

    assert!(session.writes().is_empty());
}

#[tokio::test]
async fn delete_reclassifies_mac_learned_over_tunnel() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    let v4_table = schema.table_id(es2k::L2_TO_TUNNEL_V4_TABLE).unwrap();
    session.stub_read(v4_table, vec![TableEntry::new(v4_table)]);
    let bridge = es2k_bridge(session.clone()).await;

    // The ageing event arrives without tunnel linkage; the pipeline
    // lookup decides the delete sequence.
    bridge
        .program_fdb(&plain_learn_event(), EntryOp::Delete)
        .await
        .unwrap();

    let writes = session.writes();
    assert_eq!(
        session.written_table_ids(),
        vec![
            schema.table_id(es2k::L2_FWD_TX_TABLE).unwrap(),
            v4_table,
            schema.table_id(es2k::L2_FWD_SMAC_TABLE).unwrap(),
        ]
    );
    for write in &writes {
        assert_eq!(write.op, EntryOp::Delete);
        assert!(write.entry.action.is_none());
    }
}

#[tokio::test]
async fn plain_insert_on_es2k_recovers_physical_port() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    session.stub_read(
        schema.table_id(es2k::TX_ACC_VSI_TABLE).unwrap(),
        vec![port_mapping_reply(&schema, 5)],
    );
    let bridge = es2k_bridge(session.clone()).await;

    let mut learn = plain_learn_event();
    learn.src_port = 20;
    bridge.program_fdb(&learn, EntryOp::Insert).await.unwrap();

    let writes = session.writes();
    assert_eq!(writes.len(), 3);
    // The forwarding action names the recovered physical port, not the
    // vport from the event.
    let port_param = schema
        .param_id(es2k::ACTION_L2_FWD, es2k::PARAM_PORT)
        .unwrap();
    assert_eq!(writes[0].entry.param_value(port_param), Some(&[5u8][..]));
}

#[tokio::test]
async fn tunnel_event_orders_encap_before_termination() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    let bridge = es2k_bridge(session.clone()).await;

    bridge
        .program_tunnel(&v4_tunnel_event(), EntryOp::Insert)
        .await
        .unwrap();

    assert_eq!(
        session.written_table_ids(),
        vec![
            schema.table_id(es2k::VXLAN_ENCAP_MOD_TABLE).unwrap(),
            schema.table_id(es2k::VXLAN_DECAP_MOD_TABLE).unwrap(),
            schema.table_id(es2k::IPV4_TUNNEL_TERM_TABLE).unwrap(),
        ]
    );
}

#[tokio::test]
async fn failed_write_is_enumerated_and_later_tables_still_attempted() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    session.fail_writes_to(
        schema.table_id(es2k::VXLAN_ENCAP_MOD_TABLE).unwrap(),
        SessionError::rpc(13, "internal"),
    );
    let bridge = es2k_bridge(session.clone()).await;

    let err = bridge
        .program_tunnel(&v4_tunnel_event(), EntryOp::Insert)
        .await
        .unwrap_err();

    match err {
        ProgramError::Partial { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].table, es2k::VXLAN_ENCAP_MOD_TABLE);
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
    // The decap and termination writes were still issued.
    assert_eq!(session.writes().len(), 3);
}

#[tokio::test]
async fn mixed_address_family_fails_before_any_write() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema));
    let bridge = es2k_bridge(session.clone()).await;

    let mut tunnel = v4_tunnel_event();
    tunnel.remote_ip = "2001:db8::2".parse().unwrap();
    let err = bridge
        .program_tunnel(&tunnel, EntryOp::Insert)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProgramError::Build(BuildError::MixedAddressFamily)
    ));
    assert!(session.writes().is_empty());
}

#[tokio::test]
async fn vlan_events_are_rejected_on_dpdk() {
    let session = Arc::new(MockSession::with_schema(dpdk_schema()));
    let bridge = dpdk_bridge(session.clone()).await;

    let err = bridge.program_vlan(10, EntryOp::Insert).await.unwrap_err();
    assert!(matches!(
        err,
        ProgramError::UnsupportedOnProfile {
            profile: "dpdk",
            ..
        }
    ));
    assert!(session.writes().is_empty());
}

#[tokio::test]
async fn vlan_event_programs_push_then_pop() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    let bridge = es2k_bridge(session.clone()).await;

    bridge.program_vlan(42, EntryOp::Insert).await.unwrap();

    assert_eq!(
        session.written_table_ids(),
        vec![
            schema.table_id(es2k::VLAN_PUSH_MOD_TABLE).unwrap(),
            schema.table_id(es2k::VLAN_POP_MOD_TABLE).unwrap(),
        ]
    );
}

#[tokio::test]
async fn vsi_src_port_mapping_uses_recovered_port() {
    let schema = es2k_schema();
    let session = Arc::new(MockSession::with_schema(schema.clone()));
    session.stub_read(
        schema.table_id(es2k::TX_ACC_VSI_TABLE).unwrap(),
        vec![port_mapping_reply(&schema, 7)],
    );
    let bridge = es2k_bridge(session.clone()).await;

    let sp = SrcPortInfo {
        src_port: 20,
        vlan_id: 10,
        bridge_id: 2,
    };
    bridge
        .program_vsi_src_port(&sp, EntryOp::Insert)
        .await
        .unwrap();

    let writes = session.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].entry.table_id,
        schema
            .table_id(es2k::SOURCE_PORT_TO_BRIDGE_MAP_TABLE)
            .unwrap()
    );
    match &writes[0].entry.matches[0].value {
        MatchValue::Ternary { value, .. } => assert_eq!(value, &encode_uint(7, 2)),
        other => panic!("expected ternary source-port match, got {other:?}"),
    }
}
