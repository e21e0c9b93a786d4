//! Subcommands and their execution against a [`Session`].

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Subcommand;

use quire_editor::spans::char_len;
use quire_editor::{InlineEditor, actions, filter_kinds, placeholder_for, render_markup};
use quire_types::{
    Block, BlockContent, BlockId, BlockKind, InlineFormat, InlineStyle, PageId, PageTree,
};

use crate::config::Config;
use crate::session::Session;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List block types, optionally filtered by label
    Types { query: Option<String> },

    /// Create a page
    NewPage {
        title: String,
        /// Parent page (title or id prefix)
        #[arg(long)]
        parent: Option<String>,
    },

    /// List pages as a tree
    Pages,

    /// Append a block to a page
    Add {
        page: String,
        /// Block type (text, heading, bulleted_list, todo, code, ...)
        kind: String,
        #[arg(long)]
        order: Option<u32>,
    },

    /// Replace a block's text
    Text {
        page: String,
        block: String,
        text: String,
    },

    /// Toggle a to-do's checkbox
    Check { page: String, block: String },

    /// Toggle an inline style over a char range
    Format {
        page: String,
        block: String,
        /// bold, italic, code or link
        style: String,
        start: usize,
        end: usize,
        /// Target for link spans
        #[arg(long)]
        url: Option<String>,
    },

    /// Change a block's type, keeping its text
    Turn {
        page: String,
        block: String,
        kind: String,
    },

    /// Delete a block
    Delete { page: String, block: String },

    /// Reorder blocks; listed blocks go first, the rest keep their order
    Move {
        page: String,
        #[arg(required = true)]
        blocks: Vec<String>,
    },

    /// Print a page's blocks in order
    Show {
        page: String,
        /// Render inline formats as markup
        #[arg(long)]
        markup: bool,
    },
}

impl Command {
    /// Whether running this command can change the session.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Types { .. } | Command::Pages | Command::Show { .. }
        )
    }
}

/// Run `command`, writing user-facing output to `out`.
pub fn execute(
    command: Command,
    session: &mut Session,
    config: &Config,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Types { query } => {
            for kind in filter_kinds(query.as_deref().unwrap_or("")) {
                writeln!(out, "{:<14} {}", kind.as_str(), kind.label())?;
            }
        }

        Command::NewPage { title, parent } => {
            let parent = parent.map(|p| session.resolve_page(&p)).transpose()?;
            let page = session.create_page(&title, parent)?;
            writeln!(out, "{}", page.id)?;
        }

        Command::Pages => {
            let tree = PageTree::build(session.pages.clone());
            let all: Vec<PageId> = session.pages.iter().map(|p| p.id).collect();
            for (depth, page) in tree.walk() {
                writeln!(
                    out,
                    "{}{}  {}  ({} blocks)",
                    "  ".repeat(depth),
                    page.id.unique_short(all.iter().copied()),
                    page.display_name(),
                    session.store.blocks_by_page(&page.id).len()
                )?;
            }
        }

        Command::Add { page, kind, order } => {
            let page_id = session.resolve_page(&page)?;
            let block = session.store.add_block_tagged(page_id, &kind, order)?;
            writeln!(out, "{}", block.id)?;
        }

        Command::Text { page, block, text } => {
            let page_id = session.resolve_page(&page)?;
            let block_id = session.resolve_block(&page_id, &block)?;
            if !actions::set_text(&mut session.store, &page_id, &block_id, &text) {
                bail!("block {} has no text", block_id.short());
            }
        }

        Command::Check { page, block } => {
            let page_id = session.resolve_page(&page)?;
            let block_id = session.resolve_block(&page_id, &block)?;
            let checked = actions::toggle_todo(&mut session.store, &page_id, &block_id)
                .with_context(|| format!("block {} is not a to-do", block_id.short()))?;
            writeln!(out, "{}", if checked { "checked" } else { "unchecked" })?;
        }

        Command::Format {
            page,
            block,
            style,
            start,
            end,
            url,
        } => {
            let page_id = session.resolve_page(&page)?;
            let block_id = session.resolve_block(&page_id, &block)?;
            let style = InlineStyle::parse(&style)?;
            let content = current_content(session, &page_id, &block_id)?;
            if !content.kind().supports_formats() {
                bail!("{} blocks do not take inline formats", content.kind().label());
            }

            let Some(mut editor) = InlineEditor::from_content(&content) else {
                bail!("block {} has no text", block_id.short());
            };
            if start >= end || end > char_len(editor.text()) {
                writeln!(
                    out,
                    "nothing to format ({start}..{end} is empty or outside 0..{})",
                    char_len(editor.text())
                )?;
                return Ok(());
            }
            editor.select(start..end);
            if editor.apply_style(style, url.as_deref()) {
                editor.commit(&mut session.store, &page_id, &block_id);
            } else {
                writeln!(out, "nothing to format (link without --url)")?;
            }
        }

        Command::Turn { page, block, kind } => {
            let page_id = session.resolve_page(&page)?;
            let block_id = session.resolve_block(&page_id, &block)?;
            let kind = BlockKind::parse_strict(&kind)?;
            actions::turn_into(&mut session.store, &page_id, &block_id, kind);
        }

        Command::Delete { page, block } => {
            let page_id = session.resolve_page(&page)?;
            let block_id = session.resolve_block(&page_id, &block)?;
            session.store.delete_block(&page_id, &block_id);
        }

        Command::Move { page, blocks } => {
            let page_id = session.resolve_page(&page)?;
            let mut ordered: Vec<BlockId> = Vec::new();
            for query in &blocks {
                let id = session.resolve_block(&page_id, query)?;
                if !ordered.contains(&id) {
                    ordered.push(id);
                }
            }
            for block in session.store.blocks_ordered(&page_id) {
                if !ordered.contains(&block.id) {
                    ordered.push(block.id);
                }
            }
            session.store.reorder_by_ids(page_id, &ordered);
        }

        Command::Show { page, markup } => {
            let page_id = session.resolve_page(&page)?;
            if let Some(page) = session.page(&page_id) {
                writeln!(out, "{}", page.display_name())?;
            }
            let ids: Vec<BlockId> = session.store.blocks_by_page(&page_id).iter().map(|b| b.id).collect();
            for block in session.store.blocks_ordered(&page_id) {
                writeln!(
                    out,
                    "{}  {}",
                    block.id.unique_short(ids.iter().copied()),
                    render_block(block, markup, &config.placeholder)
                )?;
            }
        }
    }
    Ok(())
}

fn current_content(session: &Session, page_id: &PageId, block_id: &BlockId) -> Result<BlockContent> {
    session
        .store
        .block_by_id(page_id, block_id)
        .map(|b| b.content.clone())
        .with_context(|| format!("block {} not found", block_id.short()))
}

/// One display line for a block.
pub fn render_block(block: &Block, markup: bool, placeholder: &str) -> String {
    let body = |text: &str, formats: &[InlineFormat]| {
        if text.is_empty() {
            let hint = match block.kind() {
                BlockKind::Text => placeholder,
                kind => placeholder_for(kind),
            };
            format!("({hint})")
        } else if markup {
            render_markup(text, formats)
        } else {
            text.to_string()
        }
    };

    match &block.content {
        BlockContent::Text(c) => body(&c.text, &c.formats),
        BlockContent::Heading(c) => {
            format!("{} {}", "#".repeat(c.level.as_u8() as usize), body(&c.text, &c.formats))
        }
        BlockContent::BulletedList(c) => format!("- {}", body(&c.text, &[])),
        BlockContent::NumberedList(c) => format!("{}. {}", block.order + 1, body(&c.text, &[])),
        BlockContent::Todo(c) => {
            format!("[{}] {}", if c.checked { "x" } else { " " }, body(&c.text, &[]))
        }
        BlockContent::Code(c) => format!("```{} {}", c.language, body(&c.text, &[])),
        BlockContent::Quote(c) => format!("> {}", body(&c.text, &[])),
        BlockContent::Divider => "---".to_string(),
        BlockContent::Image(c) => format!(
            "![{}]({})",
            c.caption.as_deref().unwrap_or_default(),
            c.url
        ),
    }
}
