//! Errors from the persistence boundary.
//!
//! Unlike the in-memory store, the repository fails loudly: a caller that
//! does not own the page's workspace gets `Unauthorized` for the whole
//! operation, and nothing is written.

use thiserror::Error;

use quire_types::{BlockId, PageId, TypeError, UserId, WorkspaceId};

/// Errors returned by a [`BlockRepository`](crate::BlockRepository).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The user does not own the workspace the page belongs to, or the page
    /// does not exist.
    #[error("unauthorized: user {user} may not access page {page}")]
    Unauthorized { user: UserId, page: PageId },

    /// The user does not own the workspace, or it does not exist.
    #[error("unauthorized: user {user} may not access workspace {workspace}")]
    WorkspaceUnauthorized { user: UserId, workspace: WorkspaceId },

    #[error("page not found: {0}")]
    PageNotFound(PageId),

    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("block already exists: {0}")]
    BlockExists(BlockId),

    /// Page title outside 1..=255 chars.
    #[error("invalid page title: {0}")]
    InvalidTitle(String),

    /// Stored content could not be turned back into a typed block.
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl SyncError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            SyncError::Unauthorized { .. } | SyncError::WorkspaceUnauthorized { .. }
        )
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, SyncError>;
