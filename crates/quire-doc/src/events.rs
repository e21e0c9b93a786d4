//! Store change events and explicit callback registration.
//!
//! The store has no ambient reactivity: anything that wants to follow changes
//! (a renderer, the persistence mirror) registers a callback with
//! [`PageStore::subscribe`](crate::PageStore::subscribe) and gets a
//! [`SubscriptionId`] back for unsubscribing. Callbacks run synchronously,
//! after the mutation is complete, in registration order.

use quire_types::{Block, BlockId, PageId};

/// Events emitted after a store mutation completes.
///
/// Tolerant misses (updating or deleting a block that is not there) emit
/// nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    /// A block was appended to a page.
    BlockAdded { block: Block },
    /// A block's content was replaced. Carries the block as it is now.
    BlockUpdated { block: Block },
    /// A block was removed from a page.
    BlockDeleted { page_id: PageId, block_id: BlockId },
    /// A page's sequence was replaced by a reorder; `block_ids` is the new
    /// order, index = `order`.
    BlocksReordered {
        page_id: PageId,
        block_ids: Vec<BlockId>,
    },
    /// A page's sequence was replaced wholesale (hydration).
    PageReplaced { page_id: PageId, block_count: usize },
    /// The whole mapping was replaced (session reset or snapshot restore).
    StoreReset,
}

impl StoreEvent {
    /// The page this event concerns, if it concerns exactly one.
    pub fn page_id(&self) -> Option<PageId> {
        match self {
            StoreEvent::BlockAdded { block } | StoreEvent::BlockUpdated { block } => {
                Some(block.page_id)
            }
            StoreEvent::BlockDeleted { page_id, .. }
            | StoreEvent::BlocksReordered { page_id, .. }
            | StoreEvent::PageReplaced { page_id, .. } => Some(*page_id),
            StoreEvent::StoreReset => None,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Boxed store observer.
pub type Callback = Box<dyn FnMut(&StoreEvent) + Send>;

/// Registered observers, in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    pub(crate) fn notify(&mut self, event: &StoreEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
