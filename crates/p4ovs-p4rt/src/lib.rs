//! P4Runtime protocol surface for the p4ovs bridge.
//!
//! This crate models the programming protocol's data structures without
//! owning the wire transport:
//!
//! - [`schema`]: the runtime-supplied pipeline schema document and the
//!   name-to-id resolver
//! - [`codec`]: canonical big-endian byte-string encoding of native values
//! - [`entry`]: table-entry descriptors and write/read request shapes
//! - [`session`]: the async boundary to the transport collaborator
//!
//! The transport (channel setup, arbitration, TLS, the actual RPCs) lives
//! behind the [`session::P4rtSession`] trait; everything in this crate is
//! plain data plus pure functions over it.

pub mod codec;
pub mod entry;
pub mod error;
pub mod schema;
pub mod session;

pub use entry::{ActionParam, ActionSpec, EntryOp, FieldMatch, MatchValue, TableEntry, WriteRequest};
pub use error::{CodecError, SchemaError, SessionError};
pub use schema::{ActionParamSchema, ActionSchema, MatchFieldSchema, MatchKind, PipelineSchema, TableSchema};
pub use session::P4rtSession;
