//! Error type shared by the gallery and storage layers.
//!
//! Graph mutations never fail: rejected operations are no-ops by contract.
//! Only operations that touch stored flows or parse external input return
//! [`FlowError`].

use crate::types::FlowId;
use thiserror::Error;

/// Errors raised while loading, saving or instantiating flows.
#[derive(Debug, Error)]
pub enum FlowError {
    /// No stored flow has the given id.
    #[error("flow {0} not found")]
    NotFound(FlowId),
    /// The template id is not one of the built-in templates.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
    /// A node type name is not part of the registry.
    #[error("unknown node type '{0}'")]
    UnknownNodeKind(String),
    /// Reading or writing the storage backend failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A flow document could not be encoded or decoded.
    #[error("invalid flow document: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result alias used by the gallery and storage APIs.
pub type Result<T> = std::result::Result<T, FlowError>;
