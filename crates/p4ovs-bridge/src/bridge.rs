//! Bridge facade: one session, one schema, one profile.

use crate::config::BridgeConfig;
use crate::error::ProgramError;
use crate::profile::{make_profile, PipelineProfile, ProgramContext};
use p4ovs_p4rt::{EntryOp, P4rtSession, PipelineSchema};
use p4ovs_types::{MacLearningInfo, SrcPortInfo, TunnelInfo};
use std::sync::Arc;
use tracing::{debug, info};

/// Translates switch dataplane events into pipeline table programming.
///
/// The schema is fetched once at construction and every entry point
/// resolves names against that snapshot; a pipeline reload needs a new
/// bridge. Entry points may be called concurrently from separate tasks.
pub struct OvsBridge {
    session: Arc<dyn P4rtSession>,
    schema: PipelineSchema,
    profile: Box<dyn PipelineProfile>,
    config: BridgeConfig,
}

impl OvsBridge {
    /// Fetches the pipeline schema over `session` and builds the bridge
    /// for the configured target profile.
    pub async fn connect(
        session: Arc<dyn P4rtSession>,
        config: BridgeConfig,
    ) -> Result<Self, ProgramError> {
        let schema = session.pipeline_schema().await?;
        info!(
            device_id = config.device_id,
            profile = %config.profile,
            tables = schema.tables.len(),
            "bridge connected"
        );
        let profile = make_profile(config.profile);
        Ok(Self {
            session,
            schema,
            profile,
            config,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn schema(&self) -> &PipelineSchema {
        &self.schema
    }

    fn ctx(&self) -> ProgramContext<'_> {
        ProgramContext {
            session: self.session.as_ref(),
            schema: &self.schema,
        }
    }

    /// Programs (or removes) the forwarding entries for one MAC
    /// learning event.
    pub async fn program_fdb(
        &self,
        learn: &MacLearningInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        debug!(mac = %learn.mac_addr, insert = op.is_insert(), "fdb event");
        self.profile.program_fdb(&self.ctx(), learn, op).await
    }

    /// Programs (or removes) the compound encap/decap/termination entry
    /// set for one tunnel port event.
    pub async fn program_tunnel(
        &self,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        debug!(vni = tunnel.vni, insert = op.is_insert(), "tunnel event");
        self.profile.program_tunnel(&self.ctx(), tunnel, op).await
    }

    /// Programs (or removes) a standalone termination entry.
    pub async fn program_tunnel_term(
        &self,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        self.profile
            .program_tunnel_term(&self.ctx(), tunnel, op)
            .await
    }

    /// Programs (or removes) the receive-side tunnel source-port entry.
    pub async fn program_rx_tunnel_src_port(
        &self,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        self.profile
            .program_rx_tunnel_src_port(&self.ctx(), tunnel, op)
            .await
    }

    /// Programs (or removes) the VLAN push/pop mod entries for a VLAN id.
    pub async fn program_vlan(&self, vlan_id: u16, op: EntryOp) -> Result<(), ProgramError> {
        debug!(vlan_id, insert = op.is_insert(), "vlan event");
        self.profile.program_vlan(&self.ctx(), vlan_id, op).await
    }

    /// Programs (or removes) a source-port to bridge mapping.
    pub async fn program_tunnel_src_port(
        &self,
        sp: &SrcPortInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        self.profile
            .program_tunnel_src_port(&self.ctx(), sp, op)
            .await
    }

    /// Programs (or removes) a source-port to bridge mapping for a VSI,
    /// resolving the vport to its paired physical port first.
    pub async fn program_vsi_src_port(
        &self,
        sp: &SrcPortInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError> {
        self.profile
            .program_vsi_src_port(&self.ctx(), sp, op)
            .await
    }
}
