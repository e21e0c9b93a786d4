//! Workspace and page metadata.
//!
//! These are the persistence-side containers around the block model: a
//! `Workspace` is owned by one user, a `Page` belongs to a workspace and may
//! nest under another page. The block list itself lives in the page store,
//! not here. This is the lightweight summary used for listing and the page
//! tree sidebar.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{PageId, UserId, WorkspaceId};
use crate::now_millis;

/// Name given to a workspace created without one.
pub const DEFAULT_WORKSPACE_NAME: &str = "My Workspace";

/// Top-level container of pages, owned by a single user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub owner: UserId,
    pub created_at: u64,
}

impl Workspace {
    /// Create a workspace; an empty or missing name falls back to the default.
    pub fn new(owner: UserId, name: Option<String>) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WORKSPACE_NAME.to_string());
        Self {
            id: WorkspaceId::new(),
            name,
            owner,
            created_at: now_millis(),
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}

/// Page metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub workspace_id: WorkspaceId,
    /// Parent page for nesting. None for top-level pages.
    pub parent_id: Option<PageId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub created_by: UserId,
    pub created_at: u64,
}

impl Page {
    pub fn new(
        workspace_id: WorkspaceId,
        parent_id: Option<PageId>,
        title: impl Into<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: PageId::new(),
            workspace_id,
            parent_id,
            title: title.into(),
            icon: None,
            cover: None,
            archived: false,
            created_by,
            created_at: now_millis(),
        }
    }

    /// Sidebar label: icon (if any) followed by the title.
    pub fn display_name(&self) -> String {
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{icon} {}", self.title),
            _ => self.title.clone(),
        }
    }
}

/// Walk a parent chain from `start` up to the root (inclusive).
///
/// Stops at a missing parent or a cycle.
pub fn page_lineage(pages: &[Page], start: PageId) -> Vec<&Page> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if !seen.insert(id) {
            break; // cycle detected
        }
        if let Some(page) = pages.iter().find(|p| p.id == id) {
            chain.push(page);
            current = page.parent_id;
        } else {
            break;
        }
    }
    chain
}

/// Pages grouped by parent, for rendering a nested sidebar.
///
/// Siblings are ordered by `created_at`, oldest first. Pages whose parent is
/// not in the set are treated as roots so nothing is silently hidden.
#[derive(Clone, Debug, Default)]
pub struct PageTree {
    roots: Vec<PageId>,
    children: HashMap<PageId, Vec<PageId>>,
    pages: HashMap<PageId, Page>,
}

impl PageTree {
    pub fn build(pages: impl IntoIterator<Item = Page>) -> Self {
        let pages: HashMap<PageId, Page> = pages.into_iter().map(|p| (p.id, p)).collect();

        let mut sorted: Vec<&Page> = pages.values().collect();
        sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut roots = Vec::new();
        let mut children: HashMap<PageId, Vec<PageId>> = HashMap::new();
        for page in sorted {
            match page.parent_id {
                Some(parent) if pages.contains_key(&parent) && parent != page.id => {
                    children.entry(parent).or_default().push(page.id);
                }
                _ => roots.push(page.id),
            }
        }

        Self {
            roots,
            children,
            pages,
        }
    }

    pub fn roots(&self) -> &[PageId] {
        &self.roots
    }

    pub fn children(&self, id: &PageId) -> &[PageId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Depth-first walk yielding `(depth, page)`, roots at depth 0.
    ///
    /// Pages caught in a parent cycle are unreachable from any root and are
    /// not yielded.
    pub fn walk(&self) -> Vec<(usize, &Page)> {
        let mut out = Vec::with_capacity(self.pages.len());
        let mut stack: Vec<(usize, PageId)> =
            self.roots.iter().rev().map(|id| (0, *id)).collect();
        let mut seen = HashSet::new();
        while let Some((depth, id)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(page) = self.pages.get(&id) {
                out.push((depth, page));
                for child in self.children(&id).iter().rev() {
                    stack.push((depth + 1, *child));
                }
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
