//! Remote block persistence.
//!
//! [`BlockRepository`] is the async seam to whatever stores blocks for real.
//! Every call names the acting user and is authorized against the owner of
//! the page's workspace. Block content crosses the seam as opaque JSON; the
//! repository does not look inside it beyond "some JSON value".
//!
//! [`MemoryRepository`] is the in-process implementation, also holding the
//! workspace and page metadata the authorization check needs.
//!
//! # Concurrency Model
//!
//! - DashMap for workspaces and pages
//! - parking_lot RwLock around the block table, so a reorder rewrites every
//!   `order` under one write guard

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use quire_types::{
    Block, BlockContent, BlockId, Page, PageId, TypeError, UserId, Workspace, WorkspaceId,
    now_millis,
};

use crate::error::{Result, SyncError};

/// Longest page title accepted.
pub const MAX_TITLE_LEN: usize = 255;

/// A block row as the repository stores it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredBlock {
    pub id: BlockId,
    pub page_id: PageId,
    /// Kind tag, duplicated outside the opaque content.
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: serde_json::Value,
    pub order: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

impl StoredBlock {
    pub fn from_block(block: &Block) -> Self {
        Self {
            id: block.id,
            page_id: block.page_id,
            block_type: block.kind().as_str().to_string(),
            content: block.content.to_value(),
            order: block.order,
            created_at: block.created_at,
            updated_at: block.updated_at,
        }
    }

    /// Decode back into a typed block.
    ///
    /// An unknown tag or a content shape that disagrees with `block_type`
    /// is an error.
    pub fn to_block(&self) -> std::result::Result<Block, TypeError> {
        let content = BlockContent::from_value(self.content.clone())?;
        if content.kind().as_str() != self.block_type {
            return Err(TypeError::MalformedContent(format!(
                "block {} is tagged {:?} but holds {} content",
                self.id,
                self.block_type,
                content.kind()
            )));
        }
        Ok(Block {
            id: self.id,
            page_id: self.page_id,
            content,
            order: self.order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Remote block operations.
#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// A page's blocks, sorted by `order`.
    async fn load_page_blocks(&self, user: UserId, page_id: PageId) -> Result<Vec<Block>>;

    /// Store a block created locally.
    async fn create_block(&self, user: UserId, block: &Block) -> Result<()>;

    /// Replace a block's content.
    async fn update_block(
        &self,
        user: UserId,
        page_id: PageId,
        block_id: BlockId,
        content: serde_json::Value,
    ) -> Result<()>;

    async fn delete_block(&self, user: UserId, page_id: PageId, block_id: BlockId) -> Result<()>;

    /// Set each listed block's `order` to its index in `block_ids`.
    async fn reorder_blocks(&self, user: UserId, page_id: PageId, block_ids: &[BlockId])
    -> Result<()>;
}

/// Optional page fields to change; `None` leaves a field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub cover: Option<String>,
    pub archived: Option<bool>,
}

/// In-process repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    workspaces: DashMap<WorkspaceId, Workspace>,
    pages: DashMap<PageId, Page>,
    blocks: RwLock<HashMap<BlockId, StoredBlock>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    fn authorize_workspace(&self, user: UserId, workspace_id: WorkspaceId) -> Result<()> {
        match self.workspaces.get(&workspace_id) {
            Some(ws) if ws.is_owned_by(user) => Ok(()),
            _ => Err(SyncError::WorkspaceUnauthorized {
                user,
                workspace: workspace_id,
            }),
        }
    }

    /// The page must exist and its workspace must belong to `user`.
    fn authorize_page(&self, user: UserId, page_id: PageId) -> Result<Page> {
        let page = self
            .pages
            .get(&page_id)
            .map(|p| p.value().clone())
            .ok_or(SyncError::Unauthorized {
                user,
                page: page_id,
            })?;
        let owned = self
            .workspaces
            .get(&page.workspace_id)
            .is_some_and(|ws| ws.is_owned_by(user));
        if !owned {
            tracing::warn!(user = %user, page = %page_id, "rejecting access to page outside user's workspaces");
            return Err(SyncError::Unauthorized {
                user,
                page: page_id,
            });
        }
        Ok(page)
    }

    // =========================================================================
    // Workspaces
    // =========================================================================

    /// Create a workspace owned by `owner`. A blank name gets the default.
    pub fn create_workspace(&self, owner: UserId, name: Option<String>) -> Workspace {
        let workspace = Workspace::new(owner, name);
        tracing::debug!(workspace = %workspace.id, owner = %owner, "workspace created");
        self.workspaces.insert(workspace.id, workspace.clone());
        workspace
    }

    /// Workspaces owned by `user`, oldest first.
    pub fn list_workspaces(&self, user: UserId) -> Vec<Workspace> {
        let mut owned: Vec<Workspace> = self
            .workspaces
            .iter()
            .filter(|ws| ws.is_owned_by(user))
            .map(|ws| ws.value().clone())
            .collect();
        owned.sort_by_key(|ws| (ws.created_at, ws.id));
        owned
    }

    // =========================================================================
    // Pages
    // =========================================================================

    pub fn create_page(
        &self,
        user: UserId,
        workspace_id: WorkspaceId,
        parent_id: Option<PageId>,
        title: &str,
    ) -> Result<Page> {
        self.authorize_workspace(user, workspace_id)?;
        validate_title(title)?;
        if let Some(parent) = parent_id {
            let parent = self.authorize_page(user, parent)?;
            if parent.workspace_id != workspace_id {
                return Err(SyncError::PageNotFound(parent.id));
            }
        }

        let page = Page::new(workspace_id, parent_id, title, user);
        tracing::debug!(page = %page.id, workspace = %workspace_id, "page created");
        self.pages.insert(page.id, page.clone());
        Ok(page)
    }

    /// A missing page is reported as `Unauthorized`, same as a foreign one.
    pub fn get_page(&self, user: UserId, page_id: PageId) -> Result<Page> {
        self.authorize_page(user, page_id)
    }

    /// Pages of a workspace under `parent_id` (`None` for top level), oldest
    /// first.
    pub fn list_pages(
        &self,
        user: UserId,
        workspace_id: WorkspaceId,
        parent_id: Option<PageId>,
    ) -> Result<Vec<Page>> {
        self.authorize_workspace(user, workspace_id)?;
        let mut pages: Vec<Page> = self
            .pages
            .iter()
            .filter(|p| p.workspace_id == workspace_id && p.parent_id == parent_id)
            .map(|p| p.value().clone())
            .collect();
        pages.sort_by_key(|p| (p.created_at, p.id));
        Ok(pages)
    }

    /// Every page of a workspace, for building a page tree.
    pub fn all_pages(&self, user: UserId, workspace_id: WorkspaceId) -> Result<Vec<Page>> {
        self.authorize_workspace(user, workspace_id)?;
        Ok(self
            .pages
            .iter()
            .filter(|p| p.workspace_id == workspace_id)
            .map(|p| p.value().clone())
            .collect())
    }

    pub fn update_page(&self, user: UserId, page_id: PageId, update: PageUpdate) -> Result<Page> {
        self.authorize_page(user, page_id)?;
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        let mut page = self
            .pages
            .get_mut(&page_id)
            .ok_or(SyncError::PageNotFound(page_id))?;
        if let Some(title) = update.title {
            page.title = title;
        }
        if let Some(icon) = update.icon {
            page.icon = Some(icon);
        }
        if let Some(cover) = update.cover {
            page.cover = Some(cover);
        }
        if let Some(archived) = update.archived {
            page.archived = archived;
        }
        Ok(page.value().clone())
    }

    /// Delete a page, its sub-pages and all their blocks.
    pub fn delete_page(&self, user: UserId, page_id: PageId) -> Result<()> {
        self.authorize_page(user, page_id)?;

        let mut doomed = vec![page_id];
        let mut index = 0;
        while let Some(current) = doomed.get(index).copied() {
            doomed.extend(
                self.pages
                    .iter()
                    .filter(|p| p.parent_id == Some(current) && !doomed.contains(&p.id))
                    .map(|p| p.id)
                    .collect::<Vec<_>>(),
            );
            index += 1;
        }

        self.blocks.write().retain(|_, b| !doomed.contains(&b.page_id));
        for id in &doomed {
            self.pages.remove(id);
        }
        tracing::debug!(page = %page_id, removed = doomed.len(), "page deleted");
        Ok(())
    }

    /// Number of stored blocks across every page.
    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(SyncError::InvalidTitle(format!(
            "title must be 1 to {MAX_TITLE_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

#[async_trait]
impl BlockRepository for MemoryRepository {
    async fn load_page_blocks(&self, user: UserId, page_id: PageId) -> Result<Vec<Block>> {
        self.authorize_page(user, page_id)?;
        let mut rows: Vec<StoredBlock> = self
            .blocks
            .read()
            .values()
            .filter(|b| b.page_id == page_id)
            .cloned()
            .collect();
        rows.sort_by_key(|b| (b.order, b.created_at, b.id));

        let blocks = rows
            .iter()
            .map(StoredBlock::to_block)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(blocks)
    }

    async fn create_block(&self, user: UserId, block: &Block) -> Result<()> {
        self.authorize_page(user, block.page_id)?;
        let mut blocks = self.blocks.write();
        if blocks.contains_key(&block.id) {
            return Err(SyncError::BlockExists(block.id));
        }
        blocks.insert(block.id, StoredBlock::from_block(block));
        Ok(())
    }

    async fn update_block(
        &self,
        user: UserId,
        page_id: PageId,
        block_id: BlockId,
        content: serde_json::Value,
    ) -> Result<()> {
        self.authorize_page(user, page_id)?;
        let mut blocks = self.blocks.write();
        let row = blocks
            .get_mut(&block_id)
            .filter(|b| b.page_id == page_id)
            .ok_or(SyncError::BlockNotFound(block_id))?;
        if let Some(tag) = content.get("type").and_then(|t| t.as_str()) {
            row.block_type = tag.to_string();
        }
        row.content = content;
        row.updated_at = now_millis().max(row.updated_at);
        Ok(())
    }

    async fn delete_block(&self, user: UserId, page_id: PageId, block_id: BlockId) -> Result<()> {
        self.authorize_page(user, page_id)?;
        let mut blocks = self.blocks.write();
        match blocks.get(&block_id) {
            Some(b) if b.page_id == page_id => {
                blocks.remove(&block_id);
                Ok(())
            }
            _ => Err(SyncError::BlockNotFound(block_id)),
        }
    }

    async fn reorder_blocks(
        &self,
        user: UserId,
        page_id: PageId,
        block_ids: &[BlockId],
    ) -> Result<()> {
        self.authorize_page(user, page_id)?;
        let mut blocks = self.blocks.write();
        if let Some(missing) = block_ids
            .iter()
            .find(|id| !blocks.get(*id).is_some_and(|b| b.page_id == page_id))
        {
            return Err(SyncError::BlockNotFound(*missing));
        }
        for (index, id) in block_ids.iter().enumerate() {
            if let Some(row) = blocks.get_mut(id) {
                row.order = index as u32;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quire_types::{BlockKind, DEFAULT_WORKSPACE_NAME};

    use super::*;

    fn setup() -> (MemoryRepository, UserId, Workspace, Page) {
        let repo = MemoryRepository::new();
        let owner = UserId::new();
        let ws = repo.create_workspace(owner, None);
        let page = repo.create_page(owner, ws.id, None, "Inbox").unwrap();
        (repo, owner, ws, page)
    }

    #[test]
    fn test_stored_block_roundtrip() {
        let mut block = Block::new(PageId::new(), BlockKind::Todo, 3);
        block.content = block.content.with_text("buy milk").with_checked(true);
        let stored = StoredBlock::from_block(&block);
        assert_eq!(stored.block_type, "todo");
        assert_eq!(stored.to_block().unwrap(), block);
    }

    #[test]
    fn test_stored_block_tag_mismatch() {
        let block = Block::new(PageId::new(), BlockKind::Quote, 0);
        let mut stored = StoredBlock::from_block(&block);
        stored.block_type = "code".into();
        assert!(matches!(stored.to_block(), Err(TypeError::MalformedContent(_))));

        stored.content = serde_json::json!({ "type": "kanban" });
        assert_eq!(
            stored.to_block(),
            Err(TypeError::UnknownBlockType("kanban".into()))
        );
    }

    #[test]
    fn test_workspace_listing_is_per_owner() {
        let (repo, owner, ws, _) = setup();
        repo.create_workspace(UserId::new(), Some("Theirs".into()));
        let mine = repo.list_workspaces(owner);
        assert_eq!(mine, [ws.clone()]);
        assert_eq!(mine[0].name, DEFAULT_WORKSPACE_NAME);
    }

    #[test]
    fn test_create_page_checks_owner_and_title() {
        let (repo, owner, ws, page) = setup();
        let stranger = UserId::new();

        assert!(repo.create_page(stranger, ws.id, None, "x").unwrap_err().is_unauthorized());
        assert!(matches!(
            repo.create_page(owner, ws.id, None, ""),
            Err(SyncError::InvalidTitle(_))
        ));
        assert!(matches!(
            repo.create_page(owner, ws.id, None, &"x".repeat(256)),
            Err(SyncError::InvalidTitle(_))
        ));

        let child = repo.create_page(owner, ws.id, Some(page.id), "Child").unwrap();
        assert_eq!(repo.list_pages(owner, ws.id, Some(page.id)).unwrap(), [child]);
        assert_eq!(repo.list_pages(owner, ws.id, None).unwrap(), [page]);
    }

    #[test]
    fn test_get_page_hides_missing_behind_unauthorized() {
        let (repo, owner, _, page) = setup();
        let stranger = UserId::new();
        let missing = PageId::new();

        assert_eq!(
            repo.get_page(stranger, missing).unwrap_err(),
            SyncError::Unauthorized {
                user: stranger,
                page: missing
            }
        );
        assert_eq!(
            repo.get_page(stranger, page.id).unwrap_err(),
            SyncError::Unauthorized {
                user: stranger,
                page: page.id
            }
        );
        assert!(repo.get_page(owner, missing).unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_get_and_update_page() {
        let (repo, owner, _, page) = setup();

        let updated = repo
            .update_page(
                owner,
                page.id,
                PageUpdate {
                    title: Some("Done".into()),
                    archived: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Done");
        assert!(updated.archived);
        assert_eq!(repo.get_page(owner, page.id).unwrap(), updated);
    }

    #[test]
    fn test_delete_page_cascades() {
        let (repo, owner, ws, page) = setup();
        let child = repo.create_page(owner, ws.id, Some(page.id), "Child").unwrap();
        let grandchild = repo.create_page(owner, ws.id, Some(child.id), "Grandchild").unwrap();
        let other = repo.create_page(owner, ws.id, None, "Other").unwrap();

        let gone = Block::new(grandchild.id, BlockKind::Text, 0);
        repo.blocks.write().insert(gone.id, StoredBlock::from_block(&gone));
        let kept = Block::new(other.id, BlockKind::Text, 0);
        repo.blocks.write().insert(kept.id, StoredBlock::from_block(&kept));

        repo.delete_page(owner, page.id).unwrap();

        assert_eq!(repo.all_pages(owner, ws.id).unwrap(), [other]);
        assert_eq!(repo.block_count(), 1);
    }
}
