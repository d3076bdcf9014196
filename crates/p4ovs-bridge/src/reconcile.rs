//! Read-before-write reconciliation against live pipeline state.
//!
//! Three checks run before certain writes: an existence probe that makes
//! MAC-learning inserts idempotent, a classification probe that tells
//! tunnel-backed MACs from VLAN-backed ones on delete, and a recovery
//! read that decodes the physical port previously paired with a VSI.

use crate::error::ProgramError;
use crate::profile::{es2k, ProgramContext};
use crate::tables::es2k::{
    ACTION_L2_FWD_AND_BYPASS_BRIDGE, L2_TO_TUNNEL_KEY_DA, L2_TO_TUNNEL_V4_TABLE,
    L2_TO_TUNNEL_V6_TABLE, PARAM_PORT,
};
use p4ovs_p4rt::codec::{decode_uint, encode_mac};
use p4ovs_p4rt::{PipelineSchema, TableEntry};
use p4ovs_types::MacLearningInfo;
use tracing::debug;

/// Which per-family tunnel-classification table holds a MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelTableClass {
    V4,
    V6,
}

/// Probes the pipeline for an entry matching `template`'s keys.
pub async fn entry_exists(
    ctx: &ProgramContext<'_>,
    template: TableEntry,
) -> Result<bool, ProgramError> {
    let entries = ctx.session.read(template).await?;
    Ok(!entries.is_empty())
}

fn l2_to_tunnel_template(
    schema: &PipelineSchema,
    table: &str,
    learn: &MacLearningInfo,
) -> Result<TableEntry, ProgramError> {
    let mut entry = TableEntry::new(schema.table_id(table)?);
    entry.match_exact(
        schema.match_field_id(table, L2_TO_TUNNEL_KEY_DA)?,
        encode_mac(&learn.mac_addr),
    );
    Ok(entry)
}

/// Looks the MAC up in both per-family classification tables. `Some`
/// means the MAC was learned over a tunnel and names the table that
/// holds it.
pub async fn classify_tunnel_fdb(
    ctx: &ProgramContext<'_>,
    learn: &MacLearningInfo,
) -> Result<Option<TunnelTableClass>, ProgramError> {
    let v4 = l2_to_tunnel_template(ctx.schema, L2_TO_TUNNEL_V4_TABLE, learn)?;
    if entry_exists(ctx, v4).await? {
        return Ok(Some(TunnelTableClass::V4));
    }

    let v6 = l2_to_tunnel_template(ctx.schema, L2_TO_TUNNEL_V6_TABLE, learn)?;
    if entry_exists(ctx, v6).await? {
        return Ok(Some(TunnelTableClass::V6));
    }
    Ok(None)
}

/// Recovers the physical port paired with a vport by reading back the
/// VSI mapping entry and decoding its forwarding-action port parameter.
pub async fn recover_physical_port(
    ctx: &ProgramContext<'_>,
    src_port: u32,
) -> Result<u32, ProgramError> {
    let template = es2k::tx_acc_vsi_read_template(ctx.schema, src_port)?;
    let entries = ctx.session.read(template).await?;

    let param_id = ctx
        .schema
        .param_id(ACTION_L2_FWD_AND_BYPASS_BRIDGE, PARAM_PORT)?;
    for entry in &entries {
        if let Some(bytes) = entry.param_value(param_id) {
            let port = decode_uint(bytes)? as u32;
            debug!(vport = src_port, port, "recovered physical port mapping");
            return Ok(port);
        }
    }
    Err(ProgramError::PortMappingNotFound(src_port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{es2k_schema, tunnel_learn_event, MockSession};
    use crate::tables::es2k::TX_ACC_VSI_TABLE;
    use p4ovs_p4rt::codec::encode_uint;
    use p4ovs_p4rt::ActionParam;
    use pretty_assertions::assert_eq;

    fn read_reply_entry(
        schema: &PipelineSchema,
        table: &str,
        action: &str,
        param: &str,
        value: Vec<u8>,
    ) -> TableEntry {
        let mut entry = TableEntry::new(schema.table_id(table).unwrap());
        let spec = entry.set_action(schema.action_id(action).unwrap());
        spec.params.push(ActionParam {
            param_id: schema.param_id(action, param).unwrap(),
            value,
        });
        entry
    }

    #[tokio::test]
    async fn test_classify_finds_v4_entry() {
        let schema = es2k_schema();
        let session = MockSession::new();
        session.stub_read(
            schema.table_id(L2_TO_TUNNEL_V4_TABLE).unwrap(),
            vec![TableEntry::new(
                schema.table_id(L2_TO_TUNNEL_V4_TABLE).unwrap(),
            )],
        );
        let ctx = ProgramContext {
            session: &session,
            schema: &schema,
        };

        let class = classify_tunnel_fdb(&ctx, &tunnel_learn_event())
            .await
            .unwrap();
        assert_eq!(class, Some(TunnelTableClass::V4));
    }

    #[tokio::test]
    async fn test_classify_falls_through_to_v6_then_none() {
        let schema = es2k_schema();
        let session = MockSession::new();
        let ctx = ProgramContext {
            session: &session,
            schema: &schema,
        };

        let class = classify_tunnel_fdb(&ctx, &tunnel_learn_event())
            .await
            .unwrap();
        assert_eq!(class, None);
        // Both classification tables were probed.
        assert_eq!(session.reads().len(), 2);
    }

    #[tokio::test]
    async fn test_recover_physical_port_decodes_param() {
        let schema = es2k_schema();
        let session = MockSession::new();
        session.stub_read(
            schema.table_id(TX_ACC_VSI_TABLE).unwrap(),
            vec![read_reply_entry(
                &schema,
                TX_ACC_VSI_TABLE,
                ACTION_L2_FWD_AND_BYPASS_BRIDGE,
                PARAM_PORT,
                encode_uint(9, 4),
            )],
        );
        let ctx = ProgramContext {
            session: &session,
            schema: &schema,
        };

        let port = recover_physical_port(&ctx, 20).await.unwrap();
        assert_eq!(port, 9);
    }

    #[tokio::test]
    async fn test_recover_physical_port_missing_entry() {
        let schema = es2k_schema();
        let session = MockSession::new();
        let ctx = ProgramContext {
            session: &session,
            schema: &schema,
        };

        let err = recover_physical_port(&ctx, 20).await.unwrap_err();
        assert_eq!(err, ProgramError::PortMappingNotFound(20));
    }
}
