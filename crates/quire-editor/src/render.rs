//! Flatten `(text, spans)` into a sequence of styled segments.
//!
//! Spans are visited in `start` order. Any gap before a span is emitted as
//! plain text, then the span's own substring with its style, then whatever
//! trails the last span. Overlaps are not reconciled: a span that starts
//! inside the previous one repeats the shared text, and the cursor follows the
//! most recent span's `end` even if that moves it backwards.

use serde::Serialize;

use quire_types::{InlineFormat, InlineStyle};

use crate::spans::{char_len, char_slice};

/// One run of rendered text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    /// `None` for plain text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<InlineStyle>,
    /// Link target, for `link` segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            url: None,
        }
    }

    pub fn styled(text: impl Into<String>, format: &InlineFormat) -> Self {
        Self {
            text: text.into(),
            style: Some(format.style),
            url: format.url().map(str::to_string),
        }
    }

    /// Markdown-ish markup for this segment.
    pub fn to_markup(&self) -> String {
        match self.style {
            None => self.text.clone(),
            Some(InlineStyle::Bold) => format!("**{}**", self.text),
            Some(InlineStyle::Italic) => format!("*{}*", self.text),
            Some(InlineStyle::Code) => format!("`{}`", self.text),
            Some(InlineStyle::Link) => {
                format!("[{}]({})", self.text, self.url.as_deref().unwrap_or_default())
            }
        }
    }
}

/// Render `text` with `formats` applied.
pub fn render_segments(text: &str, formats: &[InlineFormat]) -> Vec<Segment> {
    let mut sorted: Vec<&InlineFormat> = formats.iter().collect();
    sorted.sort_by_key(|f| f.start);

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut last = 0;
    for format in sorted {
        if format.start > last {
            segments.push(Segment::plain(char_slice(text, last, format.start)));
        }
        let styled = char_slice(text, format.start, format.end);
        if !styled.is_empty() {
            segments.push(Segment::styled(styled, format));
        }
        last = format.end;
    }

    if last < char_len(text) {
        segments.push(Segment::plain(char_slice(text, last, usize::MAX)));
    }
    segments
}

/// Render straight to markup.
pub fn render_markup(text: &str, formats: &[InlineFormat]) -> String {
    render_segments(text, formats)
        .iter()
        .map(Segment::to_markup)
        .collect()
}
