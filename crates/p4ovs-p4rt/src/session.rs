//! Async boundary to the transport collaborator.
//!
//! The session owns the gRPC channel, stream arbitration, election id,
//! and credentials; this core only asks it to fetch the pipeline schema
//! once, and to issue independent write and read RPCs. Within one
//! orchestrator call, writes are issued sequentially in builder order and
//! are never batched or reordered here. Cross-call ordering is the
//! caller's concern.

use crate::entry::{TableEntry, WriteRequest};
use crate::error::SessionError;
use crate::schema::PipelineSchema;
use async_trait::async_trait;

/// One logical programming session against a device.
#[async_trait]
pub trait P4rtSession: Send + Sync {
    /// Fetches the forwarding pipeline schema. Called once per session,
    /// at bridge construction.
    async fn pipeline_schema(&self) -> Result<PipelineSchema, SessionError>;

    /// Issues a single write RPC. Success means the device committed the
    /// entry; there is no multi-table transaction primitive.
    async fn write(&self, request: WriteRequest) -> Result<(), SessionError>;

    /// Issues a read RPC with a match-only template and returns the
    /// entries the device matched, in device order. An empty vector means
    /// no entry matched.
    async fn read(&self, template: TableEntry) -> Result<Vec<TableEntry>, SessionError>;
}
