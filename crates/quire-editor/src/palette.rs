//! Slash-command block picker.
//!
//! Typing `/` right after a space opens the palette; the query filters block
//! kinds by label; picking one closes the palette and yields the kind to
//! insert.

use quire_types::BlockKind;

use crate::keys::{Key, KeyCombo};

/// Kinds whose label contains `query`, case-insensitively, in picker order.
pub fn filter_kinds(query: &str) -> Vec<BlockKind> {
    let query = query.trim().to_lowercase();
    BlockKind::ALL
        .into_iter()
        .filter(|kind| kind.label().to_lowercase().contains(&query))
        .collect()
}

/// Whether typing `/` at char offset `cursor` of `text` should open the palette.
pub fn slash_triggered(text: &str, cursor: usize) -> bool {
    cursor > 0 && text.chars().nth(cursor - 1) == Some(' ')
}

/// Open/closed state and search query of the palette.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashPalette {
    open: bool,
    query: String,
}

impl SlashPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close and forget the query.
    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
    }

    /// Watch keydowns in a text field. Returns whether the open state changed.
    ///
    /// `text` and `cursor` describe the field before the key takes effect.
    pub fn on_key(&mut self, combo: &KeyCombo, text: &str, cursor: usize) -> bool {
        let was_open = self.open;
        if combo.key.is_char('/') && slash_triggered(text, cursor) {
            self.open = true;
        } else if combo.key == Key::Escape {
            self.close();
        }
        was_open != self.open
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Kinds matching the current query.
    pub fn matches(&self) -> Vec<BlockKind> {
        filter_kinds(&self.query)
    }

    /// Pick the `index`-th match. Closes the palette on success.
    pub fn select(&mut self, index: usize) -> Option<BlockKind> {
        if !self.open {
            return None;
        }
        let kind = self.matches().get(index).copied()?;
        self.close();
        Some(kind)
    }
}
