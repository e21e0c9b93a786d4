//! Page-scoped block document model for Quire.
//!
//! A [`PageStore`] holds one ordered block sequence per page and is the single
//! source of truth the editor UI reads from. It is a plain owned value: the
//! application root constructs it and lends `&mut` access to whatever edits it.
//!
//! # Design Philosophy
//!
//! - **Synchronous and local**: every mutation completes before the call
//!   returns. Persistence is a separate concern (see `quire-sync`), attached
//!   through [`PageStore::subscribe`].
//! - **Tolerant**: updating or deleting something that is not there is a
//!   no-op, logged at `debug`.
//! - **Page isolation**: no operation on one page touches another page's
//!   blocks.
//!
//! # Ordering
//!
//! Storage order and the `order` field are distinct. `add_block` appends and
//! records whatever `order` it was given; `reorder_blocks` is the only call
//! that makes the two agree. Render with [`PageStore::blocks_ordered`].

mod error;
mod events;
mod page_store;

pub use error::DocError;
pub use events::{Callback, StoreEvent, SubscriptionId};
pub use page_store::{PageStore, StoreSnapshot};

/// Result type for document model operations.
pub type Result<T> = std::result::Result<T, DocError>;
