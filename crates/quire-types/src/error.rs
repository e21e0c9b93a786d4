//! Error types for the untyped boundaries of the data model.
//!
//! Inside Rust the enums make these unreachable. They exist for string tags
//! coming from CLI arguments or remote JSON, where a bad value is a data
//! integrity defect and must fail loudly rather than fall back to a default.

use thiserror::Error;

/// Errors raised when converting untyped input into block types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Block type tag outside the fixed set of nine kinds.
    #[error("unknown block type: {0:?}")]
    UnknownBlockType(String),

    /// Inline style tag outside bold/italic/code/link.
    #[error("unknown inline style: {0:?}")]
    UnknownInlineStyle(String),

    /// Heading level outside 1..=3.
    #[error("invalid heading level {0} (expected 1, 2, or 3)")]
    InvalidHeadingLevel(u8),

    /// Known tag, but the payload does not match the variant's shape.
    #[error("malformed block content: {0}")]
    MalformedContent(String),
}
