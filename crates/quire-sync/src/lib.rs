//! Persistence boundary for Quire.
//!
//! The in-memory [`PageStore`](quire_doc::PageStore) is local-first: it applies
//! every edit immediately. This crate carries those edits to a
//! [`BlockRepository`] out of band and loads pages back in.
//!
//! - [`BlockRepository`]: async CRUD + reorder, authorized per call against the
//!   owner of the page's workspace
//! - [`MemoryRepository`]: in-process implementation with workspaces and pages
//! - [`SyncMirror`]: store subscriber that queues one remote call per mutation
//! - [`hydrate_page`]: load a page's authoritative block list into the store
//!
//! Failure policy differs on the two sides of the boundary. The store ignores
//! stale ids silently; the repository rejects unauthorized calls loudly. The
//! mirror reports those rejections on a broadcast channel and leaves local
//! state alone.

mod error;
mod hydrate;
mod mirror;
mod repository;

pub use error::{Result, SyncError};
pub use hydrate::hydrate_page;
pub use mirror::{RemoteCall, SyncFailure, SyncMirror, SyncOp};
pub use repository::{BlockRepository, MAX_TITLE_LEN, MemoryRepository, PageUpdate, StoredBlock};
