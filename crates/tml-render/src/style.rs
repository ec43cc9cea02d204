// SPDX-License-Identifier: MIT
//
// Style state — the full set of attributes in effect at one nesting level.
//
// A StyleState is small and `Copy`: two colors, one byte of flags, and an
// identifier that exists only so trace output can tell pushes apart. Tags
// never mutate a state in place. They describe a `StyleOverrides`, the
// stack clones its top, applies the overrides, and pushes the result.
//
// Decoding is forgiving by policy. Color values go through the fixed name
// table or pass through as integers; boolean values are true only for the
// exact token "true". Nothing here can fail.

use tml_term::color::Color;

// ─── Style Flags ─────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Boolean text attributes.
    ///
    /// ```
    /// use tml_render::style::StyleFlags;
    ///
    /// let f = StyleFlags::BOLD | StyleFlags::REVERSE;
    /// assert_eq!((f & StyleFlags::NO_EXIT).bits().count_ones(), 2);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct StyleFlags: u8 {
        const BOLD        = 1 << 0;
        const ITALIC      = 1 << 1;
        const UNDERLINE   = 1 << 2;
        const SUBSCRIPT   = 1 << 3;
        const SUPERSCRIPT = 1 << 4;
        const BLINK       = 1 << 5;
        const REVERSE     = 1 << 6;
        const STANDOUT    = 1 << 7;

        /// Attributes that have no individual exit capability. Clearing
        /// one takes either `sgr` or a full reset.
        const NO_EXIT = Self::BOLD.bits() | Self::UNDERLINE.bits()
            | Self::BLINK.bits() | Self::REVERSE.bits();
    }
}

impl StyleFlags {
    /// The flag controlled by a `span` attribute or a shorthand tag name.
    #[must_use]
    pub fn from_markup(name: &str) -> Option<Self> {
        Some(match name {
            "b" => Self::BOLD,
            "i" => Self::ITALIC,
            "u" => Self::UNDERLINE,
            "sub" => Self::SUBSCRIPT,
            "sup" => Self::SUPERSCRIPT,
            "blink" => Self::BLINK,
            "reverse" => Self::REVERSE,
            "standout" => Self::STANDOUT,
            _ => return None,
        })
    }
}

/// Decode a boolean attribute value: only the literal `true` is true.
#[inline]
#[must_use]
pub fn decode_bool(value: &str) -> bool {
    value == "true"
}

// ─── StyleState ──────────────────────────────────────────────────────────────

/// Attributes in effect at one level of the style stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleState {
    /// Push counter value when this state was created. Debugging only.
    pub id: u64,
    /// Background color.
    pub background: Color,
    /// Foreground color.
    pub foreground: Color,
    /// Boolean attributes.
    pub flags: StyleFlags,
}

impl StyleState {
    /// The sentinel base state: default colors, no flags.
    pub const BASE: Self = Self {
        id: 0,
        background: Color::Default,
        foreground: Color::Default,
        flags: StyleFlags::empty(),
    };

    /// Whether `flag` is set.
    #[inline]
    #[must_use]
    pub const fn has(&self, flag: StyleFlags) -> bool {
        self.flags.contains(flag)
    }
}

impl Default for StyleState {
    fn default() -> Self {
        Self::BASE
    }
}

// ─── StyleOverrides ──────────────────────────────────────────────────────────

/// What a style-bearing tag changes relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleOverrides {
    background: Option<Color>,
    foreground: Option<Color>,
    set: StyleFlags,
    clear: StyleFlags,
}

impl StyleOverrides {
    /// No changes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            background: None,
            foreground: None,
            set: StyleFlags::empty(),
            clear: StyleFlags::empty(),
        }
    }

    /// Set `flag` to `on`.
    #[must_use]
    pub const fn flag(mut self, flag: StyleFlags, on: bool) -> Self {
        if on {
            self.set = self.set.union(flag);
            self.clear = self.clear.difference(flag);
        } else {
            self.clear = self.clear.union(flag);
            self.set = self.set.difference(flag);
        }
        self
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Build overrides from `span` attributes.
    ///
    /// Later attributes win over earlier ones; unknown attributes are
    /// ignored.
    ///
    /// ```
    /// use tml_render::style::{StyleOverrides, StyleState, StyleFlags};
    /// use tml_term::color::Color;
    ///
    /// let o = StyleOverrides::from_attributes([("fg", "red"), ("b", "true"), ("x", "y")]);
    /// let s = o.applied_to(StyleState::BASE);
    /// assert_eq!(s.foreground, Color::Indexed(1));
    /// assert!(s.has(StyleFlags::BOLD));
    /// ```
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        attributes
            .into_iter()
            .fold(Self::new(), |acc, (name, value)| {
                let value = value.as_ref();
                match name.as_ref() {
                    "background" | "bg" => acc.background(Color::decode(value)),
                    "foreground" | "fg" => acc.foreground(Color::decode(value)),
                    other => match StyleFlags::from_markup(other) {
                        Some(flag) => acc.flag(flag, decode_bool(value)),
                        None => {
                            tracing::trace!(attribute = other, "ignoring unknown attribute");
                            acc
                        }
                    },
                }
            })
    }

    /// `parent` with these overrides applied. The identifier is kept; the
    /// stack assigns a fresh one on push.
    #[must_use]
    pub fn applied_to(&self, parent: StyleState) -> StyleState {
        let mut s = parent;
        if let Some(bg) = self.background {
            s.background = bg;
        }
        if let Some(fg) = self.foreground {
            s.foreground = fg;
        }
        s.flags = (s.flags | self.set) - self.clear;
        s
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Decoding ──────────────────────────────────────────────────────

    #[test]
    fn bool_only_true_literal() {
        assert!(decode_bool("true"));
        assert!(!decode_bool("True"));
        assert!(!decode_bool("1"));
        assert!(!decode_bool("yes"));
        assert!(!decode_bool(""));
    }

    #[test]
    fn flag_names() {
        assert_eq!(StyleFlags::from_markup("b"), Some(StyleFlags::BOLD));
        assert_eq!(StyleFlags::from_markup("i"), Some(StyleFlags::ITALIC));
        assert_eq!(StyleFlags::from_markup("u"), Some(StyleFlags::UNDERLINE));
        assert_eq!(StyleFlags::from_markup("sub"), Some(StyleFlags::SUBSCRIPT));
        assert_eq!(StyleFlags::from_markup("sup"), Some(StyleFlags::SUPERSCRIPT));
        assert_eq!(StyleFlags::from_markup("blink"), Some(StyleFlags::BLINK));
        assert_eq!(StyleFlags::from_markup("reverse"), Some(StyleFlags::REVERSE));
        assert_eq!(StyleFlags::from_markup("standout"), Some(StyleFlags::STANDOUT));
        assert_eq!(StyleFlags::from_markup("strike"), None);
    }

    #[test]
    fn markup_names_are_not_constant_names() {
        assert_eq!(StyleFlags::from_markup("BOLD"), None);
        assert_eq!(StyleFlags::from_name("BOLD"), Some(StyleFlags::BOLD));
        assert_eq!(StyleFlags::from_name("b"), None);
    }

    #[test]
    fn no_exit_set() {
        assert!(StyleFlags::NO_EXIT.contains(StyleFlags::BOLD));
        assert!(StyleFlags::NO_EXIT.contains(StyleFlags::UNDERLINE));
        assert!(StyleFlags::NO_EXIT.contains(StyleFlags::BLINK));
        assert!(StyleFlags::NO_EXIT.contains(StyleFlags::REVERSE));
        assert!(!StyleFlags::NO_EXIT.contains(StyleFlags::ITALIC));
        assert!(!StyleFlags::NO_EXIT.contains(StyleFlags::STANDOUT));
    }

    // ── Overrides ─────────────────────────────────────────────────────

    #[test]
    fn base_is_all_default() {
        let s = StyleState::default();
        assert!(s.background.is_default());
        assert!(s.foreground.is_default());
        assert!(s.flags.is_empty());
    }

    #[test]
    fn empty_overrides_keep_parent() {
        let parent = StyleOverrides::new()
            .foreground(Color::Indexed(2))
            .flag(StyleFlags::ITALIC, true)
            .applied_to(StyleState::BASE);
        assert_eq!(StyleOverrides::new().applied_to(parent), parent);
    }

    #[test]
    fn attributes_long_and_short_color_names() {
        let s = StyleOverrides::from_attributes([("background", "blue"), ("foreground", "7")])
            .applied_to(StyleState::BASE);
        assert_eq!(s.background, Color::Indexed(4));
        assert_eq!(s.foreground, Color::Indexed(7));

        let s = StyleOverrides::from_attributes([("bg", "cyan"), ("fg", "black")])
            .applied_to(StyleState::BASE);
        assert_eq!(s.background, Color::Indexed(6));
        assert_eq!(s.foreground, Color::Indexed(0));
    }

    #[test]
    fn later_attribute_wins() {
        let s = StyleOverrides::from_attributes([("bg", "red"), ("background", "green")])
            .applied_to(StyleState::BASE);
        assert_eq!(s.background, Color::Indexed(2));

        let s = StyleOverrides::from_attributes([("b", "true"), ("b", "false")])
            .applied_to(StyleState::BASE);
        assert!(!s.has(StyleFlags::BOLD));
    }

    #[test]
    fn false_attribute_clears_inherited_flag() {
        let parent = StyleOverrides::new()
            .flag(StyleFlags::UNDERLINE, true)
            .applied_to(StyleState::BASE);
        let child = StyleOverrides::from_attributes([("u", "no")]).applied_to(parent);
        assert!(!child.has(StyleFlags::UNDERLINE));
    }

    #[test]
    fn unknown_color_name_resets_to_default() {
        let parent = StyleOverrides::new()
            .foreground(Color::Indexed(1))
            .applied_to(StyleState::BASE);
        let child = StyleOverrides::from_attributes([("fg", "mauve")]).applied_to(parent);
        assert_eq!(child.foreground, Color::Default);
    }

    #[test]
    fn unknown_attributes_ignored() {
        let o = StyleOverrides::from_attributes([("class", "x"), ("style", "bold")]);
        assert_eq!(o, StyleOverrides::new());
    }

    #[test]
    fn every_flag_attribute_sets_its_flag() {
        for (name, flag) in [
            ("b", StyleFlags::BOLD),
            ("i", StyleFlags::ITALIC),
            ("u", StyleFlags::UNDERLINE),
            ("sub", StyleFlags::SUBSCRIPT),
            ("sup", StyleFlags::SUPERSCRIPT),
            ("blink", StyleFlags::BLINK),
            ("reverse", StyleFlags::REVERSE),
            ("standout", StyleFlags::STANDOUT),
        ] {
            let s = StyleOverrides::from_attributes([(name, "true")]).applied_to(StyleState::BASE);
            assert_eq!(s.flags, flag, "{name}");
        }
    }
}
