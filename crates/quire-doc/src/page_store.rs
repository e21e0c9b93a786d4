//! Page store: the ordered, page-scoped collection of blocks.
//!
//! One `Vec<Block>` per page, keyed by `PageId`. The store is the single
//! source of truth for block state on the client: UI code reads a slice,
//! renders it, and reads again after every mutation.
//!
//! # Ordering
//!
//! Blocks are kept in *storage* order (append order, or whatever a reorder or
//! hydration handed in). The `order` field is the rendering key; it is only
//! guaranteed to equal the storage index right after `reorder_blocks`. Use
//! [`PageStore::blocks_ordered`] for display.
//!
//! # Failure policy
//!
//! No editing operation returns an error. Updating or deleting a block that is
//! not there is a no-op, because UI callers routinely race a deletion with an
//! in-flight edit.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use quire_types::{Block, BlockContent, BlockId, BlockKind, PageId, now_millis};

use crate::events::{StoreEvent, Subscribers, SubscriptionId};
use crate::Result;

/// Serializable form of the whole store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Store version at snapshot time.
    #[serde(default)]
    pub version: u64,
    /// Each page's block sequence, in storage order.
    pub pages: IndexMap<PageId, Vec<Block>>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Mapping from page to its ordered block sequence.
///
/// Constructed explicitly and owned by the application root; pass `&mut` to
/// whatever edits it. Mutations take `&mut self` and complete before any
/// reader can observe the store again, so no reader ever sees a half-applied
/// change.
#[derive(Debug, Default)]
pub struct PageStore {
    /// Blocks per page, storage order.
    pages: IndexMap<PageId, Vec<Block>>,

    /// Store version (bumped on any effective mutation).
    version: u64,

    /// Change observers.
    subscribers: Subscribers,
}

impl PageStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a snapshot. No events are emitted.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            pages: snapshot.pages,
            version: snapshot.version,
            subscribers: Subscribers::default(),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Register a callback invoked after every effective mutation.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StoreEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.add(Box::new(callback))
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    fn emit(&mut self, event: StoreEvent) {
        self.version += 1;
        self.subscribers.notify(&event);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Pages the store knows about, in first-seen order.
    pub fn page_ids(&self) -> impl Iterator<Item = &PageId> {
        self.pages.keys()
    }

    pub fn contains_page(&self, page_id: &PageId) -> bool {
        self.pages.contains_key(page_id)
    }

    /// Total number of blocks across all pages.
    pub fn block_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.block_count() == 0
    }

    /// A page's blocks in storage order; empty for unknown pages.
    pub fn blocks_by_page(&self, page_id: &PageId) -> &[Block] {
        self.pages.get(page_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A page's blocks sorted by `order` ascending (storage order breaks ties).
    pub fn blocks_ordered(&self, page_id: &PageId) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks_by_page(page_id).iter().collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }

    /// Point lookup within one page.
    pub fn block_by_id(&self, page_id: &PageId, block_id: &BlockId) -> Option<&Block> {
        self.blocks_by_page(page_id).iter().find(|b| b.id == *block_id)
    }

    /// Freeze the whole mapping.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: self.version,
            pages: self.pages.clone(),
        }
    }

    // =========================================================================
    // Block Operations
    // =========================================================================

    /// Create a block of `kind` with default content and append it to the page.
    ///
    /// `order` is stored as given (default 0); it does not move the block within
    /// the sequence. Returns the created block by value.
    pub fn add_block(&mut self, page_id: PageId, kind: BlockKind, order: Option<u32>) -> Block {
        let block = Block::new(page_id, kind, order.unwrap_or(0));
        self.pages.entry(page_id).or_default().push(block.clone());

        tracing::debug!(page = %page_id, block = %block.id, %kind, order = block.order, "block added");
        self.emit(StoreEvent::BlockAdded {
            block: block.clone(),
        });
        block
    }

    /// Like [`add_block`](Self::add_block), but from an untyped tag.
    ///
    /// An unknown tag is a data-integrity defect and fails loudly.
    pub fn add_block_tagged(
        &mut self,
        page_id: PageId,
        tag: &str,
        order: Option<u32>,
    ) -> Result<Block> {
        let kind = BlockKind::parse_strict(tag)?;
        Ok(self.add_block(page_id, kind, order))
    }

    /// Replace a block's whole content and refresh `updated_at`.
    ///
    /// Not a merge: callers combine old and new fields themselves (see the
    /// `with_*` helpers on [`BlockContent`]). No-op if nothing matches.
    pub fn update_block(&mut self, page_id: &PageId, block_id: &BlockId, content: BlockContent) {
        let Some(block) = self
            .pages
            .get_mut(page_id)
            .and_then(|blocks| blocks.iter_mut().find(|b| b.id == *block_id))
        else {
            tracing::debug!(page = %page_id, block = %block_id, "update_block: no such block, ignoring");
            return;
        };

        block.content = content;
        block.updated_at = now_millis().max(block.updated_at);
        let updated = block.clone();

        tracing::debug!(page = %page_id, block = %block_id, kind = %updated.kind(), "block updated");
        self.emit(StoreEvent::BlockUpdated { block: updated });
    }

    /// Remove a block. Remaining `order` values are left as they are.
    ///
    /// No-op if absent.
    pub fn delete_block(&mut self, page_id: &PageId, block_id: &BlockId) {
        let Some(blocks) = self.pages.get_mut(page_id) else {
            tracing::debug!(page = %page_id, block = %block_id, "delete_block: unknown page, ignoring");
            return;
        };
        let before = blocks.len();
        blocks.retain(|b| b.id != *block_id);
        if blocks.len() == before {
            tracing::debug!(page = %page_id, block = %block_id, "delete_block: no such block, ignoring");
            return;
        }

        tracing::debug!(page = %page_id, block = %block_id, "block deleted");
        self.emit(StoreEvent::BlockDeleted {
            page_id: *page_id,
            block_id: *block_id,
        });
    }

    /// Replace the page's sequence and renumber `order` to `0..n`.
    ///
    /// Meant for the complete, already-permuted block list of a page (the
    /// outcome of a drag-and-drop gesture). Blocks left out of `blocks` are
    /// dropped from the page. Blocks belonging to another page are skipped,
    /// and a block listed twice keeps its first position.
    pub fn reorder_blocks(&mut self, page_id: PageId, blocks: Vec<Block>) {
        let mut seen = HashSet::new();
        let mut blocks: Vec<Block> = retain_own_page(page_id, blocks)
            .into_iter()
            .filter(|b| seen.insert(b.id))
            .collect();
        for (index, block) in blocks.iter_mut().enumerate() {
            block.order = index as u32;
        }
        let block_ids: Vec<BlockId> = blocks.iter().map(|b| b.id).collect();
        self.pages.insert(page_id, blocks);

        tracing::debug!(page = %page_id, count = block_ids.len(), "blocks reordered");
        self.emit(StoreEvent::BlocksReordered { page_id, block_ids });
    }

    /// Reorder from the final id sequence a drag-and-drop gesture produced.
    ///
    /// Ids not on the page and repeats of an id already placed are skipped;
    /// blocks whose id is missing from `ordered_ids` are dropped, as with
    /// [`reorder_blocks`](Self::reorder_blocks).
    pub fn reorder_by_ids(&mut self, page_id: PageId, ordered_ids: &[BlockId]) {
        let current = self.blocks_by_page(&page_id);
        let mut taken = HashSet::new();
        let reordered: Vec<Block> = ordered_ids
            .iter()
            .filter(|id| taken.insert(**id))
            .filter_map(|id| current.iter().find(|b| b.id == *id).cloned())
            .collect();
        self.reorder_blocks(page_id, reordered);
    }

    /// Replace the page's sequence wholesale, without touching `order`.
    ///
    /// Used to hydrate from an authoritative source. Blocks belonging to
    /// another page are skipped.
    pub fn set_page_blocks(&mut self, page_id: PageId, blocks: Vec<Block>) {
        let blocks = retain_own_page(page_id, blocks);
        let block_count = blocks.len();
        self.pages.insert(page_id, blocks);

        tracing::debug!(page = %page_id, count = block_count, "page blocks replaced");
        self.emit(StoreEvent::PageReplaced {
            page_id,
            block_count,
        });
    }

    /// Drop every page (session reset). Subscribers stay registered.
    pub fn reset(&mut self) {
        self.pages = IndexMap::new();
        tracing::debug!("store reset");
        self.emit(StoreEvent::StoreReset);
    }

    /// Replace the whole mapping with a snapshot's pages.
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        self.pages = snapshot.pages;
        tracing::debug!(pages = self.pages.len(), "store restored from snapshot");
        self.emit(StoreEvent::StoreReset);
    }
}

/// Drop blocks whose `page_id` is not `page_id`.
fn retain_own_page(page_id: PageId, blocks: Vec<Block>) -> Vec<Block> {
    let before = blocks.len();
    let blocks: Vec<Block> = blocks.into_iter().filter(|b| b.page_id == page_id).collect();
    if blocks.len() != before {
        tracing::warn!(
            page = %page_id,
            skipped = before - blocks.len(),
            "ignoring blocks that belong to another page"
        );
    }
    blocks
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use quire_types::{HeadingContent, HeadingLevel, TextContent, TodoContent};

    use super::*;

    fn text(s: &str) -> BlockContent {
        BlockContent::Text(TextContent {
            text: s.into(),
            formats: Vec::new(),
        })
    }

    #[test]
    fn test_new_store() {
        let store = PageStore::new();
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
        assert_eq!(store.page_ids().count(), 0);
    }

    #[test]
    fn test_add_block_uses_default_content() {
        let mut store = PageStore::new();
        let page = PageId::new();

        for kind in BlockKind::ALL {
            let block = store.add_block(page, kind, None);
            let found = store.block_by_id(&page, &block.id).unwrap();
            assert_eq!(found.kind(), kind);
            assert_eq!(found.content, BlockContent::default_for(kind));
            assert_eq!(found.page_id, page);
            assert_eq!(found.order, 0);
        }
        assert_eq!(store.blocks_by_page(&page).len(), BlockKind::ALL.len());
    }

    #[test]
    fn test_add_block_ids_are_unique() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let a = store.add_block(page, BlockKind::Text, None);
        let b = store.add_block(page, BlockKind::Text, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_add_block_appends_regardless_of_order() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let first = store.add_block(page, BlockKind::Text, Some(5));
        let second = store.add_block(page, BlockKind::Text, Some(1));

        let stored: Vec<BlockId> = store.blocks_by_page(&page).iter().map(|b| b.id).collect();
        assert_eq!(stored, [first.id, second.id]);
        assert_eq!(first.order, 5);

        let rendered: Vec<BlockId> = store.blocks_ordered(&page).iter().map(|b| b.id).collect();
        assert_eq!(rendered, [second.id, first.id]);
    }

    #[test]
    fn test_add_block_tagged_rejects_unknown_type() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let block = store.add_block_tagged(page, "heading", None).unwrap();
        assert_eq!(block.kind(), BlockKind::Heading);

        let err = store.add_block_tagged(page, "kanban", None).unwrap_err();
        assert!(err.to_string().contains("kanban"));
        assert_eq!(store.blocks_by_page(&page).len(), 1);
    }

    #[test]
    fn test_update_block_replaces_content_only() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let other_page = PageId::new();
        let target = store.add_block(page, BlockKind::Text, None);
        let sibling = store.add_block(page, BlockKind::Todo, Some(1));
        let elsewhere = store.add_block(other_page, BlockKind::Text, None);

        store.update_block(&page, &target.id, text("Updated text"));

        let updated = store.block_by_id(&page, &target.id).unwrap();
        assert_eq!(updated.content, text("Updated text"));
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.order, target.order);
        assert_eq!(updated.created_at, target.created_at);
        assert!(updated.updated_at >= target.updated_at);

        assert_eq!(store.block_by_id(&page, &sibling.id), Some(&sibling));
        assert_eq!(store.block_by_id(&other_page, &elsewhere.id), Some(&elsewhere));
    }

    #[test]
    fn test_update_block_is_whole_replacement() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let heading = store.add_block(page, BlockKind::Heading, None);

        let h2 = BlockContent::Heading(HeadingContent {
            text: "Intro".into(),
            level: HeadingLevel::H2,
            formats: Vec::new(),
        });
        store.update_block(&page, &heading.id, h2.clone());
        assert_eq!(store.block_by_id(&page, &heading.id).unwrap().content, h2);
    }

    #[test]
    fn test_update_block_missing_is_noop() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let block = store.add_block(page, BlockKind::Text, None);
        let version = store.version();

        store.update_block(&page, &BlockId::new(), text("ghost"));
        store.update_block(&PageId::new(), &block.id, text("wrong page"));

        assert_eq!(store.version(), version);
        assert_eq!(store.block_by_id(&page, &block.id), Some(&block));
    }

    #[test]
    fn test_updated_at_never_decreases() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let mut block = store.add_block(page, BlockKind::Text, None);
        // Hydrated data stamped in the future must not move backwards.
        block.updated_at = u64::MAX - 1;
        store.set_page_blocks(page, vec![block.clone()]);

        store.update_block(&page, &block.id, text("x"));
        assert_eq!(
            store.block_by_id(&page, &block.id).unwrap().updated_at,
            u64::MAX - 1
        );
    }

    #[test]
    fn test_delete_block() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let a = store.add_block(page, BlockKind::Text, Some(0));
        let b = store.add_block(page, BlockKind::Text, Some(1));
        let c = store.add_block(page, BlockKind::Text, Some(2));

        store.delete_block(&page, &b.id);

        let remaining = store.blocks_by_page(&page);
        assert_eq!(remaining, [a.clone(), c.clone()]);
        assert!(store.block_by_id(&page, &b.id).is_none());
        // No renumbering.
        assert_eq!(remaining[1].order, 2);
    }

    #[test]
    fn test_delete_block_missing_is_noop() {
        let mut store = PageStore::new();
        let page = PageId::new();
        store.add_block(page, BlockKind::Text, None);
        let version = store.version();

        store.delete_block(&page, &BlockId::new());
        store.delete_block(&PageId::new(), &BlockId::new());

        assert_eq!(store.blocks_by_page(&page).len(), 1);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_reorder_blocks_normalizes_order() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let b1 = store.add_block(page, BlockKind::Text, Some(7));
        let b2 = store.add_block(page, BlockKind::Text, Some(7));
        let b3 = store.add_block(page, BlockKind::Text, Some(3));

        store.reorder_blocks(page, vec![b3.clone(), b1.clone(), b2.clone()]);

        let result: Vec<(BlockId, u32)> = store
            .blocks_by_page(&page)
            .iter()
            .map(|b| (b.id, b.order))
            .collect();
        assert_eq!(result, [(b3.id, 0), (b1.id, 1), (b2.id, 2)]);
    }

    #[test]
    fn test_reorder_blocks_partial_list_drops_missing() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let a = store.add_block(page, BlockKind::Text, None);
        let _b = store.add_block(page, BlockKind::Text, None);

        store.reorder_blocks(page, vec![a.clone()]);
        assert_eq!(store.blocks_by_page(&page).len(), 1);
        assert_eq!(store.blocks_by_page(&page)[0].id, a.id);
    }

    #[test]
    fn test_reorder_skips_foreign_blocks() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let other = PageId::new();
        let mine = store.add_block(page, BlockKind::Text, None);
        let theirs = store.add_block(other, BlockKind::Text, None);

        store.reorder_blocks(page, vec![theirs.clone(), mine.clone()]);

        assert_eq!(store.blocks_by_page(&page).len(), 1);
        assert_eq!(store.blocks_by_page(&page)[0].order, 0);
        assert_eq!(store.blocks_by_page(&other), [theirs]);
    }

    #[test]
    fn test_reorder_by_ids() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let a = store.add_block(page, BlockKind::Text, None);
        let b = store.add_block(page, BlockKind::Quote, None);
        let c = store.add_block(page, BlockKind::Code, None);

        store.reorder_by_ids(page, &[c.id, BlockId::new(), a.id, b.id]);

        let ordered: Vec<(BlockId, u32)> = store
            .blocks_ordered(&page)
            .iter()
            .map(|b| (b.id, b.order))
            .collect();
        assert_eq!(ordered, [(c.id, 0), (a.id, 1), (b.id, 2)]);
    }

    #[test]
    fn test_reorder_by_ids_ignores_duplicates() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let a = store.add_block(page, BlockKind::Text, None);
        let b = store.add_block(page, BlockKind::Todo, None);

        store.reorder_by_ids(page, &[a.id, a.id, b.id]);

        let ordered: Vec<(BlockId, u32)> = store
            .blocks_by_page(&page)
            .iter()
            .map(|blk| (blk.id, blk.order))
            .collect();
        assert_eq!(ordered, [(a.id, 0), (b.id, 1)]);

        store.delete_block(&page, &a.id);
        assert_eq!(store.blocks_by_page(&page).len(), 1);
    }

    #[test]
    fn test_reorder_blocks_keeps_first_of_repeated_block() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let a = store.add_block(page, BlockKind::Text, None);
        let b = store.add_block(page, BlockKind::Text, None);

        store.reorder_blocks(page, vec![b.clone(), a.clone(), b.clone()]);

        let ids: Vec<BlockId> = store.blocks_by_page(&page).iter().map(|blk| blk.id).collect();
        assert_eq!(ids, [b.id, a.id]);
    }

    #[test]
    fn test_set_page_blocks_is_verbatim_and_idempotent() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let mut x = vec![
            Block::new(page, BlockKind::Todo, 4),
            Block::new(page, BlockKind::Text, 4),
        ];
        x[0].content = BlockContent::Todo(TodoContent {
            text: "ship".into(),
            checked: true,
        });

        store.set_page_blocks(page, x.clone());
        assert_eq!(store.blocks_by_page(&page), x.as_slice());
        store.set_page_blocks(page, x.clone());
        assert_eq!(store.blocks_by_page(&page), x.as_slice());
    }

    #[test]
    fn test_unknown_page_and_block_lookups() {
        let store = PageStore::new();
        let page = PageId::new();
        assert!(store.blocks_by_page(&page).is_empty());
        assert!(store.blocks_ordered(&page).is_empty());
        assert!(store.block_by_id(&page, &BlockId::new()).is_none());
    }

    #[test]
    fn test_cross_page_isolation() {
        let mut store = PageStore::new();
        let page_a = PageId::new();
        let page_b = PageId::new();
        let a = store.add_block(page_a, BlockKind::Text, None);
        let b = store.add_block(page_b, BlockKind::Text, None);
        let b_before = store.blocks_by_page(&page_b).to_vec();

        store.update_block(&page_a, &a.id, text("changed"));
        store.delete_block(&page_a, &a.id);
        store.reorder_blocks(page_a, Vec::new());
        // Block `b` is not on page A: nothing happens to it.
        store.update_block(&page_a, &b.id, text("nope"));

        assert_eq!(store.blocks_by_page(&page_b), b_before.as_slice());
    }

    #[test]
    fn test_subscribe_receives_events_in_order() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let block = store.add_block(page, BlockKind::Text, None);
        store.update_block(&page, &BlockId::new(), text("miss"));
        store.update_block(&page, &block.id, text("hit"));
        store.reorder_by_ids(page, &[block.id]);
        store.delete_block(&page, &block.id);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.add_block(page, BlockKind::Text, None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(matches!(&seen[0], StoreEvent::BlockAdded { block: b } if b.id == block.id));
        assert!(matches!(&seen[1], StoreEvent::BlockUpdated { block: b } if b.content == text("hit")));
        assert_eq!(
            seen[2],
            StoreEvent::BlocksReordered {
                page_id: page,
                block_ids: vec![block.id]
            }
        );
        assert_eq!(
            seen[3],
            StoreEvent::BlockDeleted {
                page_id: page,
                block_id: block.id
            }
        );
    }

    #[test]
    fn test_reset_clears_every_page() {
        let mut store = PageStore::new();
        store.add_block(PageId::new(), BlockKind::Text, None);
        store.add_block(PageId::new(), BlockKind::Text, None);
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.page_ids().count(), 0);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let block = store.add_block(page, BlockKind::Code, Some(2));
        store.update_block(&page, &block.id, BlockContent::default_for(BlockKind::Code).with_text("fn main() {}"));

        let json = store.snapshot().to_json().unwrap();
        let restored = PageStore::from_snapshot(StoreSnapshot::from_json(&json).unwrap());

        assert_eq!(restored.version(), store.version());
        assert_eq!(restored.blocks_by_page(&page), store.blocks_by_page(&page));
    }

    #[test]
    fn test_restore_replaces_mapping() {
        let mut store = PageStore::new();
        let old_page = PageId::new();
        store.add_block(old_page, BlockKind::Text, None);

        let mut other = PageStore::new();
        let new_page = PageId::new();
        other.add_block(new_page, BlockKind::Quote, None);

        store.restore(other.snapshot());
        assert!(!store.contains_page(&old_page));
        assert_eq!(store.blocks_by_page(&new_page).len(), 1);
    }
}
