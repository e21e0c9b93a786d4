//! Span arithmetic over a plain-text buffer.
//!
//! Offsets are char offsets into the plain text. Markup never occupies
//! offset space, so `**Hello** World` is still `[0, 5)` for "Hello".
//!
//! Spans are kept as an unordered list and may overlap. Toggling only ever
//! adds or removes whole spans; nothing is merged or split.

use std::ops::Range;

use quire_types::{InlineFormat, InlineStyle};

/// Length of `text` in chars.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of char offset `idx`, clamped to the end of `text`.
pub(crate) fn byte_offset(text: &str, idx: usize) -> usize {
    text.char_indices()
        .nth(idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Substring by char range, clamped to the buffer.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end).max(start);
    &text[start..end]
}

/// Toggle `style` over `range` in `formats`.
///
/// If a span with the same `(style, start, end)` exists it is removed,
/// otherwise a new one is appended. `link` needs a non-empty `url`. Returns
/// whether `formats` changed; empty or out-of-bounds ranges and links without
/// a URL leave it untouched.
pub fn toggle_format(
    text: &str,
    formats: &mut Vec<InlineFormat>,
    style: InlineStyle,
    range: Range<usize>,
    url: Option<&str>,
) -> bool {
    let Range { start, end } = range;
    if start >= end || end > char_len(text) {
        tracing::trace!(%style, start, end, "ignoring format request for empty or out-of-range selection");
        return false;
    }

    let url = url.map(str::trim).filter(|u| !u.is_empty());
    if style == InlineStyle::Link && url.is_none() {
        tracing::trace!(start, end, "ignoring link request without a url");
        return false;
    }

    if let Some(index) = formats.iter().position(|f| f.same_span(style, start, end)) {
        formats.remove(index);
        return true;
    }

    let span = match (style, url) {
        (InlineStyle::Link, Some(url)) => InlineFormat::link(start, end, url),
        _ => InlineFormat::new(style, start, end),
    };
    formats.push(span);
    true
}

/// Whether some span of `style` covers exactly `range`.
pub fn has_format(formats: &[InlineFormat], style: InlineStyle, range: Range<usize>) -> bool {
    formats
        .iter()
        .any(|f| f.same_span(style, range.start, range.end))
}

/// Styles of every span that covers char `offset`.
pub fn styles_at(formats: &[InlineFormat], offset: usize) -> Vec<InlineStyle> {
    let mut styles: Vec<InlineStyle> = formats
        .iter()
        .filter(|f| f.start <= offset && offset < f.end)
        .map(|f| f.style)
        .collect();
    styles.sort_by_key(|s| s.as_str());
    styles.dedup();
    styles
}

/// Drop spans that no longer fit a buffer of `char_len` chars.
///
/// Returns how many were dropped.
pub fn retain_fitting(formats: &mut Vec<InlineFormat>, char_len: usize) -> usize {
    let before = formats.len();
    formats.retain(|f| f.fits(char_len));
    before - formats.len()
}
