//! Inline rich-text editing for Quire blocks.
//!
//! Text-bearing blocks hold a plain-text buffer plus a list of styled spans
//! (`bold`, `italic`, `code`, `link`) in char offsets. This crate covers
//! everything between a keystroke and a [`PageStore`](quire_doc::PageStore)
//! update:
//!
//! | Module | Role |
//! |--------|------|
//! | [`spans`] | Toggle and validate spans over a buffer |
//! | [`render`] | Flatten `(text, spans)` into styled segments |
//! | [`keys`] | Key events and the formatting shortcuts |
//! | [`controller`] | [`InlineEditor`]: selection, input, commit |
//! | [`palette`] | Slash-command block picker |
//! | [`actions`] | One-field content edits (todo state, heading level, ...) |
//!
//! ```text
//! keydown ──▶ InlineEditor::handle_key ──▶ spans::toggle_format
//!                     │
//! input ────▶ InlineEditor::input          render_segments ◀── view()
//!                     │
//!                     └──▶ commit ──▶ PageStore::update_block
//! ```

pub mod actions;
pub mod controller;
pub mod keys;
pub mod palette;
pub mod render;
pub mod spans;

pub use controller::{DEFAULT_PLACEHOLDER, EditorView, InlineEditor, Selection, placeholder_for};
pub use keys::{Key, KeyCombo, KeydownResult, Modifiers};
pub use palette::{SlashPalette, filter_kinds, slash_triggered};
pub use render::{Segment, render_markup, render_segments};
pub use spans::toggle_format;

#[cfg(test)]
mod tests {
    use quire_doc::PageStore;
    use quire_types::{BlockKind, InlineStyle, PageId};

    use super::*;

    #[test]
    fn test_slash_insert_then_format() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let mut palette = SlashPalette::new();

        palette.on_key(&KeyCombo::new(Key::character("/")), "notes ", 6);
        palette.set_query("text");
        let kind = palette.select(0).unwrap();
        assert_eq!(kind, BlockKind::Text);
        let block = store.add_block(page, kind, None);

        let mut editor = InlineEditor::from_content(&block.content).unwrap();
        editor.input("Hello World");
        editor.select_caret_text("Hello", "Hello");
        editor.handle_key(&KeyCombo::ctrl(Key::character("b")), || None);
        editor.select_caret_text("Hello World", "World");
        editor.handle_key(&KeyCombo::meta(Key::character("k")), || {
            Some("https://example.com".into())
        });
        assert!(editor.commit(&mut store, &page, &block.id));

        let stored = store.block_by_id(&page, &block.id).unwrap();
        assert_eq!(
            render_markup(stored.text().unwrap(), stored.content.formats()),
            "**Hello** [World](https://example.com)"
        );
        assert_eq!(stored.content.formats()[0].style, InlineStyle::Bold);
    }
}
