//! Error types for schema resolution, value encoding, and the session
//! boundary.

use thiserror::Error;

/// A symbolic name failed to resolve against the pipeline schema.
///
/// Resolution failures abort the enclosing entry build; a descriptor with
/// an unresolved id is malformed and must never reach the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("table not found in pipeline schema: {0}")]
    TableNotFound(String),

    #[error("action not found in pipeline schema: {0}")]
    ActionNotFound(String),

    #[error("match field {field} not found in table {table}")]
    MatchFieldNotFound { table: String, field: String },

    #[error("parameter {param} not found in action {action}")]
    ParamNotFound { action: String, param: String },
}

/// Value codec failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("cannot decode {0} bytes into an unsigned integer (max 8)")]
    Overflow(usize),
}

/// Failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The RPC completed with a non-OK status.
    #[error("rpc failed with status {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The channel or stream broke before the RPC completed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The forwarding pipeline config could not be fetched.
    #[error("pipeline schema unavailable: {0}")]
    SchemaUnavailable(String),
}

impl SessionError {
    /// Shorthand for an RPC status error.
    pub fn rpc(code: i32, message: impl Into<String>) -> Self {
        SessionError::Rpc {
            code,
            message: message.into(),
        }
    }
}
