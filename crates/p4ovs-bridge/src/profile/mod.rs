//! Target-profile abstraction.
//!
//! The two supported pipelines program different table sets for the same
//! logical event, so each event kind has one implementation per profile
//! behind the [`PipelineProfile`] trait. The profile is chosen once at
//! bridge construction from [`crate::config::ProfileKind`].

pub mod dpdk;
pub mod es2k;

use crate::config::ProfileKind;
use crate::error::{ProgramError, WriteFailure};
use async_trait::async_trait;
use p4ovs_p4rt::{EntryOp, P4rtSession, PipelineSchema, TableEntry, WriteRequest};
use p4ovs_types::{MacLearningInfo, SrcPortInfo, TunnelInfo};
use tracing::warn;

pub use dpdk::DpdkProfile;
pub use es2k::Es2kProfile;

/// Per-call view of the session and the schema, borrowed by every
/// builder and reconciliation step.
pub struct ProgramContext<'a> {
    pub session: &'a dyn P4rtSession,
    pub schema: &'a PipelineSchema,
}

/// One target pipeline's translation of each event kind.
///
/// Every method issues its writes in a fixed order chosen for
/// correctness under partial failure and returns an aggregate outcome;
/// see [`TxnLog`] for the best-effort write semantics.
#[async_trait]
pub trait PipelineProfile: Send + Sync {
    /// Profile name used in logs and unsupported-operation errors.
    fn name(&self) -> &'static str;

    async fn program_fdb(
        &self,
        ctx: &ProgramContext<'_>,
        learn: &MacLearningInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError>;

    async fn program_tunnel(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError>;

    async fn program_tunnel_term(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError>;

    async fn program_rx_tunnel_src_port(
        &self,
        ctx: &ProgramContext<'_>,
        tunnel: &TunnelInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError>;

    async fn program_vlan(
        &self,
        ctx: &ProgramContext<'_>,
        vlan_id: u16,
        op: EntryOp,
    ) -> Result<(), ProgramError>;

    async fn program_tunnel_src_port(
        &self,
        ctx: &ProgramContext<'_>,
        sp: &SrcPortInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError>;

    async fn program_vsi_src_port(
        &self,
        ctx: &ProgramContext<'_>,
        sp: &SrcPortInfo,
        op: EntryOp,
    ) -> Result<(), ProgramError>;
}

/// Instantiates the profile implementation for a configured kind.
pub fn make_profile(kind: ProfileKind) -> Box<dyn PipelineProfile> {
    match kind {
        ProfileKind::Dpdk => Box::new(DpdkProfile),
        ProfileKind::Es2k => Box::new(Es2kProfile),
    }
}

/// Best-effort write log for one compound transaction.
///
/// A failed write is recorded and logged, and the remaining tables are
/// still attempted; the protocol offers no multi-table rollback, so
/// partial programming plus an enumerable failure report beats aborting
/// halfway with no report at all.
pub(crate) struct TxnLog {
    failures: Vec<WriteFailure>,
}

impl TxnLog {
    pub(crate) fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    /// Issues one write and records the outcome under `table`.
    pub(crate) async fn write(
        &mut self,
        ctx: &ProgramContext<'_>,
        table: &'static str,
        op: EntryOp,
        entry: TableEntry,
    ) {
        if let Err(error) = ctx.session.write(WriteRequest::new(op, entry)).await {
            warn!(table, %error, insert = op.is_insert(), "table write failed");
            self.failures.push(WriteFailure { table, op, error });
        }
    }

    /// Collapses the log into the entry point's aggregate outcome.
    pub(crate) fn finish(self) -> Result<(), ProgramError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ProgramError::Partial {
                failures: self.failures,
            })
        }
    }
}
