//! Block entity and type registry.
//!
//! ## Design: tag and payload in one enum
//!
//! A block's type is not stored next to its content. It *is* the content's
//! variant. [`BlockContent`] is a tagged union over the nine kinds, so the tag
//! and the payload shape can never disagree, and adding a tenth kind is a
//! compile error at every `match` that interprets content.
//!
//! [`BlockKind`] is the bare tag, used where no payload exists yet (block-type
//! pickers, `add_block`, CLI arguments). [`BlockContent::default_for`] is the
//! single authority for what a freshly created block of each kind contains.
//!
//! On the wire, content is internally tagged:
//!
//! ```json
//! { "type": "todo", "text": "ship it", "checked": false }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::format::InlineFormat;
use crate::ids::{BlockId, PageId};
use crate::{TypeError, now_millis};

/// Language assigned to freshly created code blocks.
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

/// What a block *is*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum BlockKind {
    /// Paragraph of rich text.
    #[default]
    #[strum(serialize = "text", serialize = "paragraph")]
    Text,
    /// Heading, level 1 to 3.
    #[strum(serialize = "heading", serialize = "h")]
    Heading,
    #[strum(serialize = "bulleted_list", serialize = "bullet", serialize = "ul")]
    BulletedList,
    #[strum(serialize = "numbered_list", serialize = "number", serialize = "ol")]
    NumberedList,
    /// Checkbox item.
    #[strum(serialize = "todo", serialize = "to-do")]
    Todo,
    Code,
    Quote,
    /// Horizontal rule. Carries no content.
    Divider,
    Image,
}

impl BlockKind {
    /// Every kind, in block-picker order.
    pub const ALL: [BlockKind; 9] = [
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::BulletedList,
        BlockKind::NumberedList,
        BlockKind::Todo,
        BlockKind::Code,
        BlockKind::Quote,
        BlockKind::Divider,
        BlockKind::Image,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Parse from string, failing loudly on anything outside the fixed set.
    pub fn parse_strict(s: &str) -> Result<Self, TypeError> {
        Self::from_str(s).ok_or_else(|| TypeError::UnknownBlockType(s.to_string()))
    }

    /// Wire tag (`"bulleted_list"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading => "heading",
            BlockKind::BulletedList => "bulleted_list",
            BlockKind::NumberedList => "numbered_list",
            BlockKind::Todo => "todo",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::Divider => "divider",
            BlockKind::Image => "image",
        }
    }

    /// Human-readable name for block-type pickers.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Text => "Text",
            BlockKind::Heading => "Heading",
            BlockKind::BulletedList => "Bulleted List",
            BlockKind::NumberedList => "Numbered List",
            BlockKind::Todo => "To-do",
            BlockKind::Code => "Code",
            BlockKind::Quote => "Quote",
            BlockKind::Divider => "Divider",
            BlockKind::Image => "Image",
        }
    }

    /// Whether blocks of this kind have a plain-text buffer.
    pub fn has_text(&self) -> bool {
        !matches!(self, BlockKind::Divider | BlockKind::Image)
    }

    /// Whether blocks of this kind carry inline format spans.
    pub fn supports_formats(&self) -> bool {
        matches!(self, BlockKind::Text | BlockKind::Heading)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label lookup from an untyped tag.
///
/// This is the guarded mapping access for boundaries without the type system:
/// an unknown tag is an error, never an empty label.
pub fn label_for(tag: &str) -> Result<&'static str, TypeError> {
    BlockKind::parse_strict(tag).map(|kind| kind.label())
}

// ============================================================================
// Content payloads
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<InlineFormat>,
}

/// Heading level, restricted to 1..=3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    #[default]
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = TypeError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(TypeError::InvalidHeadingLevel(other)),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level.as_u8()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingContent {
    pub text: String,
    pub level: HeadingLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<InlineFormat>,
}

/// Bulleted and numbered list items share this shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListContent {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoContent {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeContent {
    pub text: String,
    pub language: String,
}

impl Default for CodeContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            language: DEFAULT_CODE_LANGUAGE.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteContent {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Variant payload of a block, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Text(TextContent),
    Heading(HeadingContent),
    BulletedList(ListContent),
    NumberedList(ListContent),
    Todo(TodoContent),
    Code(CodeContent),
    Quote(QuoteContent),
    Divider,
    Image(ImageContent),
}

impl BlockContent {
    /// Canonical empty payload for `kind`.
    ///
    /// Block creation always goes through this, so every new block of a kind
    /// starts structurally identical regardless of caller.
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => BlockContent::Text(TextContent::default()),
            BlockKind::Heading => BlockContent::Heading(HeadingContent::default()),
            BlockKind::BulletedList => BlockContent::BulletedList(ListContent::default()),
            BlockKind::NumberedList => BlockContent::NumberedList(ListContent::default()),
            BlockKind::Todo => BlockContent::Todo(TodoContent::default()),
            BlockKind::Code => BlockContent::Code(CodeContent::default()),
            BlockKind::Quote => BlockContent::Quote(QuoteContent::default()),
            BlockKind::Divider => BlockContent::Divider,
            BlockKind::Image => BlockContent::Image(ImageContent {
                url: String::new(),
                caption: Some(String::new()),
            }),
        }
    }

    /// The kind tag of this payload.
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Heading(_) => BlockKind::Heading,
            BlockContent::BulletedList(_) => BlockKind::BulletedList,
            BlockContent::NumberedList(_) => BlockKind::NumberedList,
            BlockContent::Todo(_) => BlockKind::Todo,
            BlockContent::Code(_) => BlockKind::Code,
            BlockContent::Quote(_) => BlockKind::Quote,
            BlockContent::Divider => BlockKind::Divider,
            BlockContent::Image(_) => BlockKind::Image,
        }
    }

    /// Plain-text buffer, for kinds that have one.
    pub fn text(&self) -> Option<&str> {
        match self {
            BlockContent::Text(c) => Some(&c.text),
            BlockContent::Heading(c) => Some(&c.text),
            BlockContent::BulletedList(c) | BlockContent::NumberedList(c) => Some(&c.text),
            BlockContent::Todo(c) => Some(&c.text),
            BlockContent::Code(c) => Some(&c.text),
            BlockContent::Quote(c) => Some(&c.text),
            BlockContent::Divider | BlockContent::Image(_) => None,
        }
    }

    /// Inline spans; empty for kinds without format support.
    pub fn formats(&self) -> &[InlineFormat] {
        match self {
            BlockContent::Text(c) => &c.formats,
            BlockContent::Heading(c) => &c.formats,
            _ => &[],
        }
    }

    /// Copy of this content with the text replaced, every other field kept.
    ///
    /// Kinds without a text buffer are returned unchanged.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        match self {
            BlockContent::Text(c) => BlockContent::Text(TextContent { text, ..c.clone() }),
            BlockContent::Heading(c) => BlockContent::Heading(HeadingContent { text, ..c.clone() }),
            BlockContent::BulletedList(_) => BlockContent::BulletedList(ListContent { text }),
            BlockContent::NumberedList(_) => BlockContent::NumberedList(ListContent { text }),
            BlockContent::Todo(c) => BlockContent::Todo(TodoContent { text, ..c.clone() }),
            BlockContent::Code(c) => BlockContent::Code(CodeContent { text, ..c.clone() }),
            BlockContent::Quote(_) => BlockContent::Quote(QuoteContent { text }),
            BlockContent::Divider | BlockContent::Image(_) => self.clone(),
        }
    }

    /// Copy of this content with the spans replaced.
    ///
    /// Kinds without format support are returned unchanged.
    pub fn with_formats(&self, formats: Vec<InlineFormat>) -> Self {
        match self {
            BlockContent::Text(c) => BlockContent::Text(TextContent { formats, ..c.clone() }),
            BlockContent::Heading(c) => {
                BlockContent::Heading(HeadingContent { formats, ..c.clone() })
            }
            _ => self.clone(),
        }
    }

    /// Copy of a todo with `checked` replaced; other kinds are returned unchanged.
    pub fn with_checked(&self, checked: bool) -> Self {
        match self {
            BlockContent::Todo(c) => BlockContent::Todo(TodoContent { checked, ..c.clone() }),
            _ => self.clone(),
        }
    }

    /// Opaque JSON form, as handed to the persistence layer.
    pub fn to_value(&self) -> serde_json::Value {
        // Serializing plain data with string keys cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Parse the opaque JSON form.
    ///
    /// Unknown `type` tags are rejected loudly as `UnknownBlockType`; a known
    /// tag with the wrong shape is `MalformedContent`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, TypeError> {
        if let Some(tag) = value.get("type").and_then(|t| t.as_str()) {
            BlockKind::parse_strict(tag)?;
        }
        serde_json::from_value(value).map_err(|e| TypeError::MalformedContent(e.to_string()))
    }
}

// ============================================================================
// Block
// ============================================================================

/// One content unit on a page.
///
/// `id` and `page_id` never change after creation. `order` positions the block
/// among its page siblings; it is only guaranteed contiguous right after a
/// reorder. Timestamps are Unix milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub page_id: PageId,
    pub content: BlockContent,
    pub order: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Block {
    /// Fresh block with a new id and the kind's default content.
    pub fn new(page_id: PageId, kind: BlockKind, order: u32) -> Self {
        let now = now_millis();
        Self {
            id: BlockId::new(),
            page_id,
            content: BlockContent::default_for(kind),
            order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Kind of this block (derived from its content).
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    /// Plain text, if this kind has any.
    pub fn text(&self) -> Option<&str> {
        self.content.text()
    }
}

// ============================================================================
// Tests
// ============================================================================
