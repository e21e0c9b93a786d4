//! The on-disk session: one user, one workspace, its pages and the block
//! store snapshot.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use quire_doc::{PageStore, StoreSnapshot};
use quire_types::{BlockId, Page, PageId, UserId, Workspace, resolve_prefix};

#[derive(Serialize, Deserialize)]
struct SessionFile {
    user: UserId,
    workspace: Workspace,
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    store: StoreSnapshot,
}

/// Everything the CLI edits.
#[derive(Debug)]
pub struct Session {
    pub user: UserId,
    pub workspace: Workspace,
    pub pages: Vec<Page>,
    pub store: PageStore,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session with a new user and a default-named workspace.
    pub fn new() -> Self {
        let user = UserId::new();
        Self {
            user,
            workspace: Workspace::new(user, None),
            pages: Vec::new(),
            store: PageStore::new(),
        }
    }

    /// Read a session file; a missing file starts a new session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no session file yet, starting fresh");
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: SessionFile = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Self {
            user: file.user,
            workspace: file.workspace,
            pages: file.pages,
            store: PageStore::from_snapshot(file.store),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = SessionFile {
            user: self.user,
            workspace: self.workspace.clone(),
            pages: self.pages.clone(),
            store: self.store.snapshot(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), blocks = self.store.block_count(), "session saved");
        Ok(())
    }

    pub fn create_page(&mut self, title: &str, parent: Option<PageId>) -> Result<&Page> {
        let title = title.trim();
        if title.is_empty() {
            bail!("page title must not be empty");
        }
        let page = Page::new(self.workspace.id, parent, title, self.user);
        tracing::info!(page = %page.id, title, "page created");
        self.pages.push(page);
        Ok(&self.pages[self.pages.len() - 1])
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == *id)
    }

    /// A page by exact title (case-insensitive) or unique id prefix.
    pub fn resolve_page(&self, query: &str) -> Result<PageId> {
        let by_title: Vec<&Page> = self
            .pages
            .iter()
            .filter(|p| p.title.eq_ignore_ascii_case(query))
            .collect();
        if let [page] = by_title.as_slice() {
            return Ok(page.id);
        }

        if let Ok(id) = PageId::parse(query)
            && self.page(&id).is_some()
        {
            return Ok(id);
        }

        let by_prefix: Vec<&Page> = self
            .pages
            .iter()
            .filter(|p| p.id.matches_hex_prefix(query))
            .collect();
        match by_prefix.as_slice() {
            [page] => Ok(page.id),
            [] if by_title.is_empty() => bail!("no page matches {query:?}"),
            _ => bail!("{query:?} matches several pages, use a longer id prefix"),
        }
    }

    /// A block on `page_id` by unique id prefix.
    pub fn resolve_block(&self, page_id: &PageId, query: &str) -> Result<BlockId> {
        let ids = self.store.blocks_by_page(page_id).iter().map(|b| b.id);
        Ok(resolve_prefix(ids, query)?)
    }
}
