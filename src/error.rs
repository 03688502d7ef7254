//! Fatal error taxonomy for the renderer core.
//!
//! Every variant here is fatal: there is no partial-output recovery. Non-fatal
//! findings go through [`crate::diagnostics::Diagnostics`] instead.

use thiserror::Error;

use crate::ir::TypeId;

/// Result type for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Fatal errors raised by the renderer core.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("name reached serialization unassigned (node {node:?} in namespace {namespace})")]
    UnassignedName { node: TypeId, namespace: String },

    #[error("target does not support rendering this type shape: {kind} ({detail})")]
    UnsupportedTypeShape { kind: String, detail: String },

    #[error("union cannot be resolved to a discriminated sum: {reason}")]
    UnresolvableUnion { reason: String },

    #[error("type graph has a cycle that does not cross a named boundary: {path}")]
    CycleBeyondNamedBoundary { path: String },

    #[error("failed to deserialize type graph: {0}")]
    Deserialize(#[from] serde_json::Error),
}



