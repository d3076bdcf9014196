//! OVS dataplane-event to P4Runtime table-programming bridge.
//!
//! The bridge receives native event records (MAC learning, tunnel
//! add/remove, VLAN push/pop, source-port mapping) from the software
//! switch and turns each into the ordered sequence of table writes the
//! target forwarding pipeline needs, resolving symbolic table/action/
//! field names against the runtime-supplied pipeline schema.
//!
//! Layout:
//!
//! - [`bridge`]: [`OvsBridge`], one async entry point per event kind
//! - [`profile`]: the target-profile abstraction and per-profile entry
//!   builders (DPDK and ES2K pipelines diverge in table topology)
//! - [`reconcile`]: read-before-write checks (idempotent inserts, delete
//!   classification, physical-port recovery)
//! - [`tables`]: P4 object names per target profile
//! - [`config`]: bridge configuration
//! - [`testing`]: mock session and schema fixtures for tests

pub mod bridge;
pub mod config;
pub mod error;
pub mod profile;
pub mod reconcile;
pub mod tables;
pub mod testing;

pub use bridge::OvsBridge;
pub use config::{BridgeConfig, ProfileKind};
pub use error::{BuildError, ProgramError, WriteFailure};
pub use profile::{PipelineProfile, ProgramContext};
