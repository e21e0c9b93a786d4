//! Error types for document model operations.
//!
//! Editing operations on the store never fail: a missing page or block is a
//! silent no-op. Errors only come from untyped entry points (string block
//! tags) and from snapshot (de)serialization.

use thiserror::Error;

use quire_types::TypeError;

/// Errors that can occur at the edges of the document model.
#[derive(Error, Debug)]
pub enum DocError {
    /// Untyped input named a block type or content shape that does not exist.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
