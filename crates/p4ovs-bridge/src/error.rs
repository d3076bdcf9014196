//! Error taxonomy of the translation core.

use p4ovs_p4rt::{CodecError, EntryOp, SchemaError, SessionError};
use std::fmt;
use thiserror::Error;

/// An entry could not be built from the event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A table/action/field/param name did not resolve.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Local and remote tunnel endpoints are not both IPv4 or both IPv6.
    #[error("unsupported combination: local/remote address families differ or are unsupported")]
    MixedAddressFamily,

    /// The event is tunnel-classified but carries no tunnel linkage.
    #[error("tunnel-classified event is missing tunnel info")]
    MissingTunnelInfo,

    /// The target's table set has no IPv6 underlay variant.
    #[error("unsupported combination: IPv6 underlay is not supported by this table set")]
    Ipv6NotSupported,
}

/// One failed write inside a compound transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// Name of the table whose write failed.
    pub table: &'static str,
    /// Intent of the failed write.
    pub op: EntryOp,
    /// The underlying session error.
    pub error: SessionError,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.op.is_insert() { "insert" } else { "delete" };
        write!(f, "{} into {} failed: {}", op, self.table, self.error)
    }
}

/// Aggregate outcome of one orchestrator entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Entry construction failed before anything was written.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A reconciliation read or other pre-write RPC failed; the
    /// transaction was aborted.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A previously-programmed value could not be decoded back.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Some writes in the compound transaction failed. Writes are
    /// best-effort: later tables were still attempted after an earlier
    /// failure, and each failure is enumerated here.
    #[error("{} of the transaction's writes failed", failures.len())]
    Partial { failures: Vec<WriteFailure> },

    /// The VSI-to-physical-port table has no entry for this vport.
    #[error("no physical port mapping found for vport {0}")]
    PortMappingNotFound(u32),

    /// The selected target profile does not program this table set.
    #[error("operation {op} is not supported on the {profile} profile")]
    UnsupportedOnProfile {
        op: &'static str,
        profile: &'static str,
    },
}

impl From<SchemaError> for ProgramError {
    fn from(err: SchemaError) -> Self {
        ProgramError::Build(BuildError::Schema(err))
    }
}
