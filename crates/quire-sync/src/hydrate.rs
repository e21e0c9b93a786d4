//! Loading a page from the repository into the store.

use quire_doc::PageStore;
use quire_types::{PageId, UserId};

use crate::error::Result;
use crate::repository::BlockRepository;

/// Replace `page_id`'s blocks in `store` with the repository's copy.
///
/// The authoritative list overrides whatever the session holds for that
/// page. On error the store is left untouched. Returns the block count.
pub async fn hydrate_page(
    repo: &dyn BlockRepository,
    user: UserId,
    page_id: PageId,
    store: &mut PageStore,
) -> Result<usize> {
    let blocks = repo.load_page_blocks(user, page_id).await?;
    let count = blocks.len();
    store.set_page_blocks(page_id, blocks);
    tracing::debug!(page = %page_id, count, "page hydrated from repository");
    Ok(count)
}
