//! Platform-agnostic key events and the inline formatting shortcuts.

use quire_types::InlineStyle;

/// Key values, after the W3C `KeyboardEvent.key` naming.
///
/// Only the keys the inline editor reacts to get their own variant; anything
/// else arrives as `Character` or `Unidentified`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(String),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
}

impl Key {
    pub fn character(s: impl Into<String>) -> Self {
        Key::Character(s.into())
    }

    /// Whether this is the character key `c`, ignoring ASCII case.
    pub fn is_char(&self, c: char) -> bool {
        match self {
            Key::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(first), None) if first.eq_ignore_ascii_case(&c))
            }
            Key::Space => c == ' ',
            _ => false,
        }
    }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Ctrl or Cmd held. Either one triggers shortcuts on every platform.
    pub fn has_primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::CTRL,
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::META,
        }
    }

    /// The inline style this combo toggles, if it is a formatting shortcut.
    ///
    /// Ctrl/Cmd + `b` bold, `i` italic, `` ` `` code, `k` link.
    pub fn format_shortcut(&self) -> Option<InlineStyle> {
        if !self.modifiers.has_primary() {
            return None;
        }
        FORMAT_SHORTCUTS
            .iter()
            .find(|(c, _)| self.key.is_char(*c))
            .map(|(_, style)| *style)
    }
}

/// Shortcut character per style, as shown in toolbar tooltips.
pub const FORMAT_SHORTCUTS: [(char, InlineStyle); 4] = [
    ('b', InlineStyle::Bold),
    ('i', InlineStyle::Italic),
    ('`', InlineStyle::Code),
    ('k', InlineStyle::Link),
];

/// Result of handling a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was swallowed without effect (e.g. Enter in a single-line editor).
    Suppressed,
    /// Event was not a keybinding, let the platform handle it.
    NotHandled,
}

impl KeydownResult {
    /// Whether the platform default action should be prevented.
    pub fn prevent_default(&self) -> bool {
        !matches!(self, KeydownResult::NotHandled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_shortcuts() {
        assert_eq!(
            KeyCombo::ctrl(Key::character("b")).format_shortcut(),
            Some(InlineStyle::Bold)
        );
        assert_eq!(
            KeyCombo::meta(Key::character("i")).format_shortcut(),
            Some(InlineStyle::Italic)
        );
        assert_eq!(
            KeyCombo::ctrl(Key::character("`")).format_shortcut(),
            Some(InlineStyle::Code)
        );
        assert_eq!(
            KeyCombo::ctrl(Key::character("K")).format_shortcut(),
            Some(InlineStyle::Link)
        );
    }

    #[test]
    fn test_no_shortcut_without_primary_modifier() {
        assert_eq!(KeyCombo::new(Key::character("b")).format_shortcut(), None);
        assert_eq!(
            KeyCombo::with_modifiers(Key::character("b"), Modifiers::SHIFT).format_shortcut(),
            None
        );
        assert_eq!(KeyCombo::ctrl(Key::character("x")).format_shortcut(), None);
        assert_eq!(KeyCombo::ctrl(Key::character("bb")).format_shortcut(), None);
        assert_eq!(KeyCombo::ctrl(Key::Enter).format_shortcut(), None);
    }

    #[test]
    fn test_prevent_default() {
        assert!(KeydownResult::Handled.prevent_default());
        assert!(KeydownResult::Suppressed.prevent_default());
        assert!(!KeydownResult::NotHandled.prevent_default());
    }
}
