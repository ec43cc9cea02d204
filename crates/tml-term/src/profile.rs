// SPDX-License-Identifier: MIT
//
// Built-in terminal profiles — a small capability database.
//
// Each profile says which capabilities a family of terminals has and how
// many palette colors it can select. Expansion is direct ECMA-48 (SGR)
// encoding, the same byte-level strings the terminfo entries for these
// terminals contain, so there is no runtime dependency on an installed
// terminfo database.
//
// Lookup goes from the `$TERM` string to a profile: exact names first,
// then well-known suffixes (`-256color`) and prefixes (`xterm`, `screen`,
// `vt1`). Unknown terminal types are not guessed at; the caller treats
// them as a setup error.

use crate::capability::{Capability, CapabilityProvider, CapabilityRequest, CapabilitySet};

// ─── Dialect ─────────────────────────────────────────────────────────────────

/// How a terminal family spells the few sequences that differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Full ECMA-48: every attribute has its own reset code.
    Ecma48,
    /// DEC VT100: standout exit is a full `CSI m`.
    Vt100,
    /// mintty: ECMA-48 plus SGR 73/74/75 for super/subscript.
    Mintty,
}

// ─── TerminalProfile ─────────────────────────────────────────────────────────

/// Capabilities and palette size of one terminal family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalProfile {
    /// Canonical terminal name.
    pub name: &'static str,
    /// Capabilities this terminal provides.
    pub capabilities: CapabilitySet,
    /// Number of selectable palette colors (0 = monochrome).
    pub colors: i32,
    /// Column count reported when the window size is unknown.
    pub columns: u16,
    /// Escape spelling differences.
    pub dialect: Dialect,
}

const ECMA_ATTRS: CapabilitySet = CapabilitySet::VT100.union(CapabilitySet::ITALICS);

/// Every built-in profile.
pub const PROFILES: &[TerminalProfile] = &[
    TerminalProfile {
        name: "dumb",
        capabilities: CapabilitySet::empty(),
        colors: 0,
        columns: 80,
        dialect: Dialect::Ecma48,
    },
    TerminalProfile {
        name: "vt100",
        capabilities: CapabilitySet::VT100,
        colors: 0,
        columns: 80,
        dialect: Dialect::Vt100,
    },
    TerminalProfile {
        name: "sun",
        capabilities: CapabilitySet::SGR0
            .union(CapabilitySet::BOLD)
            .union(CapabilitySet::SMUL)
            .union(CapabilitySet::REV)
            .union(CapabilitySet::SMSO)
            .union(CapabilitySet::RMSO)
            .union(CapabilitySet::COLOR),
        colors: 8,
        columns: 80,
        dialect: Dialect::Ecma48,
    },
    TerminalProfile {
        name: "linux",
        capabilities: CapabilitySet::VT100.union(CapabilitySet::COLOR),
        colors: 8,
        columns: 80,
        dialect: Dialect::Ecma48,
    },
    TerminalProfile {
        name: "screen",
        capabilities: CapabilitySet::VT100.union(CapabilitySet::COLOR),
        colors: 8,
        columns: 80,
        dialect: Dialect::Ecma48,
    },
    TerminalProfile {
        name: "xterm",
        capabilities: ECMA_ATTRS.union(CapabilitySet::COLOR),
        colors: 8,
        columns: 80,
        dialect: Dialect::Ecma48,
    },
    TerminalProfile {
        name: "xterm-256color",
        capabilities: ECMA_ATTRS.union(CapabilitySet::COLOR),
        colors: 256,
        columns: 80,
        dialect: Dialect::Ecma48,
    },
    TerminalProfile {
        name: "mintty",
        capabilities: ECMA_ATTRS
            .union(CapabilitySet::COLOR)
            .union(CapabilitySet::SSUBM)
            .union(CapabilitySet::RSUBM)
            .union(CapabilitySet::SSUPM)
            .union(CapabilitySet::RSUPM),
        colors: 256,
        columns: 80,
        dialect: Dialect::Mintty,
    },
];

/// Modern emulators whose `$TERM` is their own name but which behave as
/// `xterm-256color`.
const XTERM_256_ALIASES: &[&str] = &[
    "alacritty",
    "foot",
    "wezterm",
    "xterm-kitty",
    "xterm-ghostty",
    "xterm-direct",
    "iterm2",
];

impl TerminalProfile {
    /// Find a profile by its canonical name.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        PROFILES.iter().find(|p| p.name == name).copied()
    }

    /// Resolve a `$TERM` value to a profile.
    ///
    /// # Examples
    ///
    /// ```
    /// use tml_term::profile::TerminalProfile;
    ///
    /// assert_eq!(TerminalProfile::lookup("tmux-256color").unwrap().colors, 256);
    /// assert_eq!(TerminalProfile::lookup("vt102").unwrap().name, "vt100");
    /// assert!(TerminalProfile::lookup("no-such-terminal").is_none());
    /// ```
    #[must_use]
    pub fn lookup(term: &str) -> Option<Self> {
        if let Some(p) = Self::named(term) {
            return Some(p);
        }
        if XTERM_256_ALIASES.contains(&term) || term.ends_with("-256color") {
            return Self::named("xterm-256color");
        }
        let family = if term.starts_with("xterm") || term.starts_with("rxvt") {
            "xterm"
        } else if term.starts_with("screen") || term.starts_with("tmux") {
            "screen"
        } else if term.starts_with("vt1") || term.starts_with("vt2") {
            "vt100"
        } else if term.starts_with("sun") {
            "sun"
        } else if term.starts_with("linux") {
            "linux"
        } else if term == "ansi" || term == "cygwin" {
            "xterm"
        } else {
            return None;
        };
        Self::named(family)
    }

    fn expand_color(&self, base: u16, bright_base: u16, extended: u16, index: i32) -> Option<Vec<u8>> {
        if index < 0 || index >= self.colors {
            return None;
        }
        let code = u16::try_from(index).ok()?;
        let s = if code < 8 {
            format!("\x1b[{}m", base + code)
        } else if code < 16 {
            format!("\x1b[{}m", bright_base + code - 8)
        } else {
            format!("\x1b[{extended};5;{code}m")
        };
        Some(s.into_bytes())
    }
}

/// Expand `sgr` with terminfo parameter order: standout, underline,
/// reverse, blink, dim, bold, invisible, protect, altcharset.
fn expand_sgr(request: &CapabilityRequest) -> Vec<u8> {
    let on = |n: usize| request.param(n) != 0;
    let mut s = String::from("\x1b[0");
    if on(6) {
        s.push_str(";1");
    }
    if on(5) {
        s.push_str(";2");
    }
    if on(2) {
        s.push_str(";4");
    }
    if on(1) || on(3) {
        s.push_str(";7");
    }
    if on(4) {
        s.push_str(";5");
    }
    if on(7) {
        s.push_str(";8");
    }
    s.push('m');
    s.into_bytes()
}

impl CapabilityProvider for TerminalProfile {
    fn supports(&self, cap: Capability) -> bool {
        self.capabilities.has(cap)
    }

    fn expand(&self, request: &CapabilityRequest) -> Option<Vec<u8>> {
        let cap = request.capability;
        if !self.supports(cap) {
            return None;
        }
        let fixed: &[u8] = match cap {
            Capability::SetAttributes => return Some(expand_sgr(request)),
            Capability::SetABackground => return self.expand_color(40, 100, 48, request.param(1)),
            Capability::SetAForeground => return self.expand_color(30, 90, 38, request.param(1)),
            Capability::ExitAttributeMode => b"\x1b[0m",
            Capability::EnterBoldMode => b"\x1b[1m",
            Capability::EnterUnderlineMode => b"\x1b[4m",
            Capability::EnterBlinkMode => b"\x1b[5m",
            Capability::EnterReverseMode | Capability::EnterStandoutMode => b"\x1b[7m",
            Capability::ExitStandoutMode => match self.dialect {
                Dialect::Vt100 => b"\x1b[m",
                Dialect::Ecma48 | Dialect::Mintty => b"\x1b[27m",
            },
            Capability::EnterItalicsMode => b"\x1b[3m",
            Capability::ExitItalicsMode => b"\x1b[23m",
            Capability::EnterSuperscriptMode => b"\x1b[73m",
            Capability::EnterSubscriptMode => b"\x1b[74m",
            Capability::ExitSubscriptMode | Capability::ExitSuperscriptMode => b"\x1b[75m",
        };
        Some(fixed.to_vec())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
