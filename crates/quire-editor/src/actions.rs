//! Content-editing actions fired by block widgets.
//!
//! Each action reads the block's current content, changes one field and hands
//! the merged content to [`PageStore::update_block`]. They all return `false`
//! when the block is gone or is not of a kind the action applies to, and
//! leave the store untouched in that case.

use quire_doc::PageStore;
use quire_types::{BlockContent, BlockId, BlockKind, HeadingLevel, ImageContent, PageId};

fn current(store: &PageStore, page_id: &PageId, block_id: &BlockId) -> Option<BlockContent> {
    let content = store.block_by_id(page_id, block_id).map(|b| b.content.clone());
    if content.is_none() {
        tracing::debug!(page = %page_id, block = %block_id, "action on missing block ignored");
    }
    content
}

/// Replace the plain text, keeping spans that still fit.
pub fn set_text(store: &mut PageStore, page_id: &PageId, block_id: &BlockId, text: &str) -> bool {
    let Some(content) = current(store, page_id, block_id) else {
        return false;
    };
    if !content.kind().has_text() {
        return false;
    }
    let len = text.chars().count();
    let formats = content
        .formats()
        .iter()
        .filter(|f| f.fits(len))
        .cloned()
        .collect();
    store.update_block(page_id, block_id, content.with_text(text).with_formats(formats));
    true
}

/// Set a todo's checkbox.
pub fn set_checked(store: &mut PageStore, page_id: &PageId, block_id: &BlockId, checked: bool) -> bool {
    match current(store, page_id, block_id) {
        Some(content @ BlockContent::Todo(_)) => {
            store.update_block(page_id, block_id, content.with_checked(checked));
            true
        }
        _ => false,
    }
}

/// Flip a todo's checkbox. Returns the new state.
pub fn toggle_todo(store: &mut PageStore, page_id: &PageId, block_id: &BlockId) -> Option<bool> {
    let BlockContent::Todo(todo) = current(store, page_id, block_id)? else {
        return None;
    };
    let checked = !todo.checked;
    set_checked(store, page_id, block_id, checked).then_some(checked)
}

pub fn set_heading_level(
    store: &mut PageStore,
    page_id: &PageId,
    block_id: &BlockId,
    level: HeadingLevel,
) -> bool {
    match current(store, page_id, block_id) {
        Some(BlockContent::Heading(mut heading)) => {
            heading.level = level;
            store.update_block(page_id, block_id, BlockContent::Heading(heading));
            true
        }
        _ => false,
    }
}

pub fn set_code_language(
    store: &mut PageStore,
    page_id: &PageId,
    block_id: &BlockId,
    language: &str,
) -> bool {
    match current(store, page_id, block_id) {
        Some(BlockContent::Code(mut code)) => {
            code.language = language.to_string();
            store.update_block(page_id, block_id, BlockContent::Code(code));
            true
        }
        _ => false,
    }
}

/// Point an image block at `url`; `caption` of `None` keeps the old caption.
pub fn set_image(
    store: &mut PageStore,
    page_id: &PageId,
    block_id: &BlockId,
    url: &str,
    caption: Option<&str>,
) -> bool {
    match current(store, page_id, block_id) {
        Some(BlockContent::Image(image)) => {
            let content = BlockContent::Image(ImageContent {
                url: url.to_string(),
                caption: caption.map(str::to_string).or(image.caption),
            });
            store.update_block(page_id, block_id, content);
            true
        }
        _ => false,
    }
}

/// Change a block's kind in place, carrying its text over.
///
/// The new kind starts from its default content; spans survive only when
/// both kinds support them.
pub fn turn_into(store: &mut PageStore, page_id: &PageId, block_id: &BlockId, kind: BlockKind) -> bool {
    let Some(content) = current(store, page_id, block_id) else {
        return false;
    };
    if content.kind() == kind {
        return true;
    }
    let mut next = BlockContent::default_for(kind);
    if let Some(text) = content.text() {
        next = next.with_text(text).with_formats(content.formats().to_vec());
    }
    store.update_block(page_id, block_id, next);
    true
}

#[cfg(test)]
mod tests {
    use quire_types::{InlineFormat, InlineStyle};

    use super::*;

    fn setup(kind: BlockKind) -> (PageStore, PageId, BlockId) {
        let mut store = PageStore::new();
        let page = PageId::new();
        let block = store.add_block(page, kind, None);
        (store, page, block.id)
    }

    #[test]
    fn test_set_text_drops_spans_that_no_longer_fit() {
        let (mut store, page, id) = setup(BlockKind::Text);
        let content = BlockContent::default_for(BlockKind::Text)
            .with_text("Hello World")
            .with_formats(vec![
                InlineFormat::new(InlineStyle::Bold, 0, 5),
                InlineFormat::new(InlineStyle::Italic, 6, 11),
            ]);
        store.update_block(&page, &id, content);

        assert!(set_text(&mut store, &page, &id, "Hello"));
        let block = store.block_by_id(&page, &id).unwrap();
        assert_eq!(block.text(), Some("Hello"));
        assert_eq!(block.content.formats(), [InlineFormat::new(InlineStyle::Bold, 0, 5)]);
    }

    #[test]
    fn test_set_text_on_divider_is_rejected() {
        let (mut store, page, id) = setup(BlockKind::Divider);
        assert!(!set_text(&mut store, &page, &id, "nope"));
        assert_eq!(store.block_by_id(&page, &id).unwrap().content, BlockContent::Divider);
    }

    #[test]
    fn test_toggle_todo_keeps_text() {
        let (mut store, page, id) = setup(BlockKind::Todo);
        set_text(&mut store, &page, &id, "write docs");

        assert_eq!(toggle_todo(&mut store, &page, &id), Some(true));
        assert_eq!(toggle_todo(&mut store, &page, &id), Some(false));
        assert!(set_checked(&mut store, &page, &id, true));

        let block = store.block_by_id(&page, &id).unwrap();
        assert_eq!(block.text(), Some("write docs"));
        assert!(matches!(&block.content, BlockContent::Todo(t) if t.checked));
    }

    #[test]
    fn test_actions_on_wrong_kind_or_missing_block() {
        let (mut store, page, id) = setup(BlockKind::Text);
        let version = store.version();
        assert!(!set_checked(&mut store, &page, &id, true));
        assert_eq!(toggle_todo(&mut store, &page, &id), None);
        assert!(!set_heading_level(&mut store, &page, &id, HeadingLevel::H2));
        assert!(!set_code_language(&mut store, &page, &id, "rust"));
        assert!(!set_image(&mut store, &page, &id, "x.png", None));
        assert!(!set_text(&mut store, &page, &BlockId::new(), "ghost"));
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_heading_code_image() {
        let mut store = PageStore::new();
        let page = PageId::new();
        let heading = store.add_block(page, BlockKind::Heading, None).id;
        let code = store.add_block(page, BlockKind::Code, None).id;
        let image = store.add_block(page, BlockKind::Image, None).id;

        assert!(set_heading_level(&mut store, &page, &heading, HeadingLevel::H2));
        assert!(set_code_language(&mut store, &page, &code, "rust"));
        assert!(set_image(&mut store, &page, &image, "cat.png", Some("a cat")));
        assert!(set_image(&mut store, &page, &image, "dog.png", None));

        assert!(matches!(
            &store.block_by_id(&page, &heading).unwrap().content,
            BlockContent::Heading(h) if h.level == HeadingLevel::H2
        ));
        assert!(matches!(
            &store.block_by_id(&page, &code).unwrap().content,
            BlockContent::Code(c) if c.language == "rust"
        ));
        assert_eq!(
            store.block_by_id(&page, &image).unwrap().content,
            BlockContent::Image(ImageContent {
                url: "dog.png".into(),
                caption: Some("a cat".into()),
            })
        );
    }

    #[test]
    fn test_turn_into_carries_text() {
        let (mut store, page, id) = setup(BlockKind::Text);
        set_text(&mut store, &page, &id, "Ship it");

        assert!(turn_into(&mut store, &page, &id, BlockKind::Todo));
        let block = store.block_by_id(&page, &id).unwrap();
        assert_eq!(block.kind(), BlockKind::Todo);
        assert_eq!(block.text(), Some("Ship it"));

        assert!(turn_into(&mut store, &page, &id, BlockKind::Divider));
        assert_eq!(store.block_by_id(&page, &id).unwrap().content, BlockContent::Divider);
    }
}
