// SPDX-License-Identifier: MIT
//
// Tag vocabulary — element names mapped to what they do.

use tml_term::color::Color;

use crate::style::StyleFlags;

/// A recognized (or unrecognized) element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `span`: style scope configured by attributes.
    Span,
    /// `b`, `i`, `u`, `sub`, `sup`, `blink`, `reverse`, `standout`.
    Flag(StyleFlags),
    /// A color name used as a tag: sets the foreground.
    Foreground(Color),
    /// `br`: line break.
    Break,
    /// `p`: line break unless already at the start of a line.
    Paragraph,
    /// `s`, `tt`, `big`, `small`: accepted for compatibility, no effect.
    Placeholder,
    /// `tml`: the document root.
    Root,
    /// Anything else. Ignored.
    Unknown,
}

const FOREGROUND_TAGS: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

impl Tag {
    /// Classify an element name. Matching is case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "span" => Self::Span,
            "br" => Self::Break,
            "p" => Self::Paragraph,
            "s" | "tt" | "big" | "small" => Self::Placeholder,
            "tml" => Self::Root,
            _ => {
                if let Some(flag) = StyleFlags::from_markup(name) {
                    Self::Flag(flag)
                } else if FOREGROUND_TAGS.contains(&name) {
                    Color::from_name(name).map_or(Self::Unknown, Self::Foreground)
                } else {
                    Self::Unknown
                }
            }
        }
    }

    /// Whether the start of this tag pushes a style, so its end pops one.
    #[must_use]
    pub const fn is_style_scope(self) -> bool {
        matches!(self, Self::Span | Self::Flag(_) | Self::Foreground(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_tags() {
        assert_eq!(Tag::from_name("span"), Tag::Span);
        assert_eq!(Tag::from_name("br"), Tag::Break);
        assert_eq!(Tag::from_name("p"), Tag::Paragraph);
        assert_eq!(Tag::from_name("tml"), Tag::Root);
    }

    #[test]
    fn flag_shorthands() {
        assert_eq!(Tag::from_name("b"), Tag::Flag(StyleFlags::BOLD));
        assert_eq!(Tag::from_name("sup"), Tag::Flag(StyleFlags::SUPERSCRIPT));
        assert_eq!(Tag::from_name("standout"), Tag::Flag(StyleFlags::STANDOUT));
    }

    #[test]
    fn color_tags() {
        assert_eq!(Tag::from_name("black"), Tag::Foreground(Color::Indexed(0)));
        assert_eq!(Tag::from_name("red"), Tag::Foreground(Color::Indexed(1)));
        assert_eq!(Tag::from_name("white"), Tag::Foreground(Color::Indexed(7)));
    }

    #[test]
    fn default_is_not_a_color_tag() {
        assert_eq!(Tag::from_name("default"), Tag::Unknown);
    }

    #[test]
    fn placeholders() {
        for name in ["s", "tt", "big", "small"] {
            assert_eq!(Tag::from_name(name), Tag::Placeholder, "{name}");
        }
    }

    #[test]
    fn unknown_and_case_sensitive() {
        assert_eq!(Tag::from_name("div"), Tag::Unknown);
        assert_eq!(Tag::from_name("B"), Tag::Unknown);
        assert_eq!(Tag::from_name(""), Tag::Unknown);
    }

    #[test]
    fn style_scopes() {
        assert!(Tag::Span.is_style_scope());
        assert!(Tag::from_name("u").is_style_scope());
        assert!(Tag::from_name("cyan").is_style_scope());
        assert!(!Tag::Break.is_style_scope());
        assert!(!Tag::Paragraph.is_style_scope());
        assert!(!Tag::Root.is_style_scope());
        assert!(!Tag::Unknown.is_style_scope());
    }
}
