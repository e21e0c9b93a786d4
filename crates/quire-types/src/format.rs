//! Inline format spans over a block's plain-text buffer.
//!
//! A span is `(style, start, end)` in **char** offsets into the plain text,
//! never into any rendered or escaped form. Spans may overlap; nothing here
//! merges or splits them. The operations that create and toggle spans live in
//! `quire-editor`; this module is the data shape plus validity checks.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::TypeError;

/// Key under which a `link` span stores its target.
pub const URL_KEY: &str = "url";

/// Inline style applied to a span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum InlineStyle {
    #[strum(serialize = "bold", serialize = "b")]
    Bold,
    #[strum(serialize = "italic", serialize = "i", serialize = "em")]
    Italic,
    Code,
    #[strum(serialize = "link", serialize = "a")]
    Link,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 4] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Code,
        InlineStyle::Link,
    ];

    /// Parse from string (case-insensitive), failing loudly on unknown tags.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        <Self as FromStr>::from_str(s).map_err(|_| TypeError::UnknownInlineStyle(s.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InlineStyle::Bold => "bold",
            InlineStyle::Italic => "italic",
            InlineStyle::Code => "code",
            InlineStyle::Link => "link",
        }
    }
}

impl std::fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One styled span.
///
/// `link` spans carry `data["url"]`; other styles carry no data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFormat {
    pub style: InlineStyle,
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl InlineFormat {
    /// A data-less span.
    pub fn new(style: InlineStyle, start: usize, end: usize) -> Self {
        Self {
            style,
            start,
            end,
            data: BTreeMap::new(),
        }
    }

    /// A `link` span pointing at `url`.
    pub fn link(start: usize, end: usize, url: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(URL_KEY.to_string(), url.into());
        Self {
            style: InlineStyle::Link,
            start,
            end,
            data,
        }
    }

    /// Link target, if any.
    pub fn url(&self) -> Option<&str> {
        self.data.get(URL_KEY).map(String::as_str)
    }

    /// Whether this span has the same `(style, start, end)` identity.
    pub fn same_span(&self, style: InlineStyle, start: usize, end: usize) -> bool {
        self.style == style && self.start == start && self.end == end
    }

    /// `0 <= start < end <= char_len`.
    pub fn fits(&self, char_len: usize) -> bool {
        self.start < self.end && self.end <= char_len
    }

    /// Span length in chars.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parse_aliases() {
        assert_eq!(InlineStyle::parse("BOLD"), Ok(InlineStyle::Bold));
        assert_eq!(InlineStyle::parse("em"), Ok(InlineStyle::Italic));
        assert_eq!(InlineStyle::parse("a"), Ok(InlineStyle::Link));
        assert_eq!(
            InlineStyle::parse("strike"),
            Err(TypeError::UnknownInlineStyle("strike".into()))
        );
    }

    #[test]
    fn test_plain_span_serializes_without_data() {
        let span = InlineFormat::new(InlineStyle::Bold, 0, 5);
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"style": "bold", "start": 0, "end": 5})
        );
    }

    #[test]
    fn test_link_span_carries_url() {
        let span = InlineFormat::link(6, 11, "https://example.com");
        assert_eq!(span.url(), Some("https://example.com"));
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["data"]["url"], "https://example.com");
    }

    #[test]
    fn test_fits() {
        let span = InlineFormat::new(InlineStyle::Italic, 2, 4);
        assert!(span.fits(4));
        assert!(!span.fits(3));
        assert!(!InlineFormat::new(InlineStyle::Italic, 3, 3).fits(10));
    }
}
