// SPDX-License-Identifier: MIT
//
// Terminal color model — the terminal's own default, or a palette index.
//
// Markup names colors either by one of the eight classic ANSI names or by a
// bare palette index. There is no RGB here: the capability database only
// knows how to select palette entries, and "default" is not a palette entry
// at all. A terminal can only get back to its default colors through a full
// attribute reset, which is why `Default` is a distinct variant rather than
// a sentinel index the renderer might accidentally pass to `setab`.

use std::fmt;

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal color as seen by the capability layer.
///
/// # Examples
///
/// ```
/// use tml_term::color::Color;
///
/// assert_eq!(Color::decode("red"), Color::Indexed(1));
/// assert_eq!(Color::decode("200"), Color::Indexed(200));
/// assert_eq!(Color::decode("chartreuse"), Color::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's configured default color.
    #[default]
    Default,
    /// A palette index, passed verbatim to the color capabilities.
    Indexed(i32),
}

/// Palette index curses uses for "the default color".
const DEFAULT_INDEX: i32 = -1;

/// The fixed color name table. Names are matched exactly (case-sensitive).
pub const NAMED_COLORS: [(&str, Color); 9] = [
    ("default", Color::Default),
    ("black", Color::Indexed(0)),
    ("red", Color::Indexed(1)),
    ("green", Color::Indexed(2)),
    ("yellow", Color::Indexed(3)),
    ("blue", Color::Indexed(4)),
    ("magenta", Color::Indexed(5)),
    ("cyan", Color::Indexed(6)),
    ("white", Color::Indexed(7)),
];

impl Color {
    /// Build a color from a raw palette index. `-1` is the terminal default.
    #[inline]
    #[must_use]
    pub const fn from_index(index: i32) -> Self {
        if index == DEFAULT_INDEX {
            Self::Default
        } else {
            Self::Indexed(index)
        }
    }

    /// Look up one of the names in [`NAMED_COLORS`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, color)| color)
    }

    /// Decode an attribute value into a color.
    ///
    /// A string that is entirely a base-10 integer wins over the name table
    /// and passes through unchanged. Known names map through the table.
    /// Anything else is the terminal default; decoding never fails.
    #[must_use]
    pub fn decode(value: &str) -> Self {
        if let Ok(index) = value.parse::<i32>() {
            return Self::from_index(index);
        }
        Self::from_name(value).unwrap_or_default()
    }

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// The palette index, or `-1` for the default color.
    #[inline]
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::Default => DEFAULT_INDEX,
            Self::Indexed(i) => i,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Default => f.write_str("default"),
            Self::Indexed(i) => match NAMED_COLORS.iter().find(|(_, c)| *c == *self) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "{i}"),
            },
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
