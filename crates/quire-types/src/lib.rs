//! Shared identity, block, and page types for Quire.
//!
//! This crate is the data foundation: typed IDs, the block type registry,
//! inline format spans, and workspace/page metadata. It has **no internal
//! quire dependencies**. It is a leaf crate that the store, editor, and sync
//! crates build on.
//!
//! # Entity-Relationship Overview
//!
//! ```text
//! User (UserId)
//!     └── owns Workspace (WorkspaceId)
//!
//! Workspace (WorkspaceId)
//!     └── contains Page (PageId), parent_id forms the page tree
//!
//! Page (PageId)
//!     └── owns an ordered sequence of Block (BlockId)
//!
//! Block (BlockId)
//!     └── BlockContent: one of nine kinds, tag and payload in one enum
//!     └── text-bearing kinds may carry InlineFormat spans
//! ```
//!
//! # Key Types
//!
//! |--------------------|-------------------------------------------------|
//! | Type               | Purpose                                         |
//! |--------------------|-------------------------------------------------|
//! | [`Block`]          | One content unit on a page                      |
//! | [`BlockKind`]      | Which of the nine block types                   |
//! | [`BlockContent`]   | Variant payload, tagged by kind                 |
//! | [`InlineFormat`]   | Styled span over a block's plain text           |
//! | [`Page`]           | Page metadata (workspace + parent lineage)      |
//! | [`Workspace`]      | Top-level container owned by one user           |
//! |--------------------|-------------------------------------------------|

pub mod block;
pub mod error;
pub mod format;
pub mod ids;
pub mod page;

// Re-export primary types at crate root for convenience.
pub use block::{
    Block, BlockContent, BlockKind, CodeContent, HeadingContent, HeadingLevel, ImageContent,
    ListContent, QuoteContent, TextContent, TodoContent, DEFAULT_CODE_LANGUAGE, label_for,
};
pub use error::TypeError;
pub use format::{InlineFormat, InlineStyle, URL_KEY};
pub use ids::{BlockId, PageId, PrefixError, UserId, WorkspaceId, resolve_prefix};
pub use page::{DEFAULT_WORKSPACE_NAME, Page, PageTree, Workspace, page_lineage};

/// Current time as Unix milliseconds. Used by constructors throughout the crate.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
