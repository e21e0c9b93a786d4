//! Inline editor controller for one text-bearing block.
//!
//! The controller owns an editing buffer `(text, formats)` plus the current
//! selection. UI events (typing, selection changes, shortcut keys, toolbar
//! clicks) are fed in; [`InlineEditor::commit`] writes the buffer back to the
//! page store.

use std::ops::Range;

use quire_doc::PageStore;
use quire_types::{BlockContent, BlockId, BlockKind, InlineFormat, InlineStyle, PageId};

use crate::keys::{Key, KeyCombo, KeydownResult};
use crate::render::{Segment, render_segments};
use crate::spans::{char_len, char_slice, retain_fitting, toggle_format};

/// Placeholder shown by an empty editor unless one is configured.
pub const DEFAULT_PLACEHOLDER: &str = "Start typing...";

/// Placeholder for an empty block of `kind`.
pub fn placeholder_for(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Todo => "Add a task...",
        BlockKind::BulletedList | BlockKind::NumberedList => "Add an item...",
        _ => DEFAULT_PLACEHOLDER,
    }
}

/// A selection range in char offsets.
///
/// The anchor is where the selection started; the head is where the cursor
/// is now. When anchor == head, the selection is collapsed (cursor only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Offsets from what the platform reports about a live selection.
    ///
    /// `pre_caret` is the plain text from the start of the editor up to the
    /// selection end; `selected` is the selected plain text. Only plain text
    /// is measured, so markup never shifts the offsets.
    pub fn from_caret_text(pre_caret: &str, selected: &str) -> Self {
        let end = char_len(pre_caret);
        let start = end.saturating_sub(char_len(selected));
        Self::new(start, end)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Clamp both ends to a buffer of `len` chars.
    fn clamped(self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.head.min(len))
    }
}

/// What the editor surface should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorView {
    /// Buffer is empty.
    Placeholder(String),
    Segments(Vec<Segment>),
}

/// Editing state for one block's text and inline spans.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineEditor {
    text: String,
    formats: Vec<InlineFormat>,
    selection: Selection,
    multiline: bool,
    rich: bool,
    placeholder: String,
}

impl InlineEditor {
    pub fn new(text: impl Into<String>, formats: Vec<InlineFormat>) -> Self {
        let text = text.into();
        let mut formats = formats;
        retain_fitting(&mut formats, char_len(&text));
        Self {
            text,
            formats,
            selection: Selection::default(),
            multiline: false,
            rich: true,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    /// Editor over a block's content.
    ///
    /// Returns `None` for kinds without a text buffer. Paragraphs, code and
    /// quotes are multi-line; headings and list items are single-line.
    /// Only kinds that store inline formats accept styles.
    pub fn from_content(content: &BlockContent) -> Option<Self> {
        let text = content.text()?;
        let kind = content.kind();
        let multiline = matches!(kind, BlockKind::Text | BlockKind::Code | BlockKind::Quote);
        Some(
            Self::new(text, content.formats().to_vec())
                .multiline(multiline)
                .rich(kind.supports_formats())
                .with_placeholder(placeholder_for(kind)),
        )
    }

    pub fn multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Whether styles can be applied. A plain editor ignores them.
    pub fn rich(mut self, rich: bool) -> Self {
        self.rich = rich;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn formats(&self) -> &[InlineFormat] {
        &self.formats
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_rich(&self) -> bool {
        self.rich
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Currently selected plain text.
    pub fn selected_text(&self) -> &str {
        char_slice(&self.text, self.selection.start(), self.selection.end())
    }

    /// Set the selection, clamped to the buffer.
    pub fn select(&mut self, range: Range<usize>) {
        self.selection = Selection::new(range.start, range.end).clamped(char_len(&self.text));
    }

    /// Set the selection from platform caret text (see [`Selection::from_caret_text`]).
    pub fn select_caret_text(&mut self, pre_caret: &str, selected: &str) {
        self.selection = Selection::from_caret_text(pre_caret, selected).clamped(char_len(&self.text));
    }

    /// Toggle `style` over the current selection.
    ///
    /// A collapsed selection or a plain editor does nothing. Otherwise the
    /// toggle is attempted
    /// and the selection collapses to its end, whether or not a span changed
    /// (a link without a URL, for instance). Returns whether the spans changed.
    pub fn apply_style(&mut self, style: InlineStyle, url: Option<&str>) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        if !self.rich {
            tracing::debug!(%style, "plain editor, ignoring inline style");
            self.selection = Selection::collapsed(self.selection.end());
            return false;
        }
        let range = self.selection.range();
        let changed = toggle_format(&self.text, &mut self.formats, style, range.clone(), url);
        self.selection = Selection::collapsed(range.end);
        if changed {
            tracing::debug!(%style, start = range.start, end = range.end, spans = self.formats.len(), "inline format toggled");
        }
        changed
    }

    /// Keydown dispatch.
    ///
    /// Formatting shortcuts are always consumed. For `link`, `prompt_url` is
    /// asked for a target only when there is something selected. Enter is
    /// swallowed in single-line editors.
    pub fn handle_key<F>(&mut self, combo: &KeyCombo, prompt_url: F) -> KeydownResult
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(style) = combo.format_shortcut() {
            if style == InlineStyle::Link && !self.selection.is_collapsed() {
                let url = prompt_url();
                self.apply_style(style, url.as_deref());
            } else {
                self.apply_style(style, None);
            }
            return KeydownResult::Handled;
        }

        if combo.key == Key::Enter && !self.multiline {
            return KeydownResult::Suppressed;
        }
        KeydownResult::NotHandled
    }

    /// Plain-text input event: the buffer now reads `text`.
    ///
    /// Spans are kept as they are, except those that no longer fit the new
    /// buffer, which are dropped.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let len = char_len(&self.text);
        let dropped = retain_fitting(&mut self.formats, len);
        if dropped > 0 {
            tracing::debug!(dropped, len, "dropped inline formats past the end of the text");
        }
        self.selection = self.selection.clamped(len);
    }

    /// Segments to draw, or the placeholder for an empty buffer.
    pub fn view(&self) -> EditorView {
        if self.text.is_empty() {
            return EditorView::Placeholder(self.placeholder.clone());
        }
        EditorView::Segments(render_segments(&self.text, &self.formats))
    }

    /// Merge the buffer into the block's current content and store it.
    ///
    /// Every other content field (heading level, todo state, code language)
    /// is kept. Returns false if the block is gone.
    pub fn commit(&self, store: &mut PageStore, page_id: &PageId, block_id: &BlockId) -> bool {
        let Some(block) = store.block_by_id(page_id, block_id) else {
            tracing::debug!(page = %page_id, block = %block_id, "commit: block no longer exists");
            return false;
        };
        let content = block
            .content
            .with_text(self.text.as_str())
            .with_formats(self.formats.clone());
        store.update_block(page_id, block_id, content);
        true
    }
}
