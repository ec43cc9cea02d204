// SPDX-License-Identifier: MIT
//
// Terminal capabilities — named, parameterizable control sequences.
//
// A capability is the terminfo idea of "a thing this terminal knows how to
// do": enter bold mode, set the background to palette entry N, reset every
// attribute. The renderer plans its output as a list of capability requests
// and hands each one to a `CapabilityProvider`, which either produces the
// control string for the active terminal or reports that the terminal has
// no such capability. Absence is never an error; the request is dropped.
//
// Only the capabilities the style diff needs are modeled. The short names
// are the terminfo capnames, which keeps trace output comparable with
// `infocmp`.

use std::fmt;

// ─── Capability ──────────────────────────────────────────────────────────────

/// A terminal capability the renderer may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `sgr0` — turn off all attributes, including colors.
    ExitAttributeMode,
    /// `sgr` — set many attributes at once (nine parameters).
    SetAttributes,
    /// `bold` — enter bold mode. No individual exit.
    EnterBoldMode,
    /// `smul` — enter underline mode.
    EnterUnderlineMode,
    /// `blink` — enter blink mode. No individual exit.
    EnterBlinkMode,
    /// `rev` — enter reverse video. No individual exit.
    EnterReverseMode,
    /// `smso` — enter standout mode.
    EnterStandoutMode,
    /// `rmso` — exit standout mode.
    ExitStandoutMode,
    /// `sitm` — enter italics.
    EnterItalicsMode,
    /// `ritm` — exit italics.
    ExitItalicsMode,
    /// `ssubm` — enter subscript.
    EnterSubscriptMode,
    /// `rsubm` — exit subscript.
    ExitSubscriptMode,
    /// `ssupm` — enter superscript.
    EnterSuperscriptMode,
    /// `rsupm` — exit superscript.
    ExitSuperscriptMode,
    /// `setab` — set background to a palette index (one parameter).
    SetABackground,
    /// `setaf` — set foreground to a palette index (one parameter).
    SetAForeground,
}

impl Capability {
    /// Every modeled capability, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::ExitAttributeMode,
        Self::SetAttributes,
        Self::EnterBoldMode,
        Self::EnterUnderlineMode,
        Self::EnterBlinkMode,
        Self::EnterReverseMode,
        Self::EnterStandoutMode,
        Self::ExitStandoutMode,
        Self::EnterItalicsMode,
        Self::ExitItalicsMode,
        Self::EnterSubscriptMode,
        Self::ExitSubscriptMode,
        Self::EnterSuperscriptMode,
        Self::ExitSuperscriptMode,
        Self::SetABackground,
        Self::SetAForeground,
    ];

    /// The terminfo capname.
    #[must_use]
    pub const fn capname(self) -> &'static str {
        match self {
            Self::ExitAttributeMode => "sgr0",
            Self::SetAttributes => "sgr",
            Self::EnterBoldMode => "bold",
            Self::EnterUnderlineMode => "smul",
            Self::EnterBlinkMode => "blink",
            Self::EnterReverseMode => "rev",
            Self::EnterStandoutMode => "smso",
            Self::ExitStandoutMode => "rmso",
            Self::EnterItalicsMode => "sitm",
            Self::ExitItalicsMode => "ritm",
            Self::EnterSubscriptMode => "ssubm",
            Self::ExitSubscriptMode => "rsubm",
            Self::EnterSuperscriptMode => "ssupm",
            Self::ExitSuperscriptMode => "rsupm",
            Self::SetABackground => "setab",
            Self::SetAForeground => "setaf",
        }
    }

    /// The bit this capability occupies in a [`CapabilitySet`].
    #[must_use]
    pub const fn flag(self) -> CapabilitySet {
        match self {
            Self::ExitAttributeMode => CapabilitySet::SGR0,
            Self::SetAttributes => CapabilitySet::SGR,
            Self::EnterBoldMode => CapabilitySet::BOLD,
            Self::EnterUnderlineMode => CapabilitySet::SMUL,
            Self::EnterBlinkMode => CapabilitySet::BLINK,
            Self::EnterReverseMode => CapabilitySet::REV,
            Self::EnterStandoutMode => CapabilitySet::SMSO,
            Self::ExitStandoutMode => CapabilitySet::RMSO,
            Self::EnterItalicsMode => CapabilitySet::SITM,
            Self::ExitItalicsMode => CapabilitySet::RITM,
            Self::EnterSubscriptMode => CapabilitySet::SSUBM,
            Self::ExitSubscriptMode => CapabilitySet::RSUBM,
            Self::EnterSuperscriptMode => CapabilitySet::SSUPM,
            Self::ExitSuperscriptMode => CapabilitySet::RSUPM,
            Self::SetABackground => CapabilitySet::SETAB,
            Self::SetAForeground => CapabilitySet::SETAF,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.capname())
    }
}

// ─── CapabilitySet ───────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// The set of capabilities a terminal profile provides.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CapabilitySet: u16 {
        const SGR0  = 1 << 0;
        const SGR   = 1 << 1;
        const BOLD  = 1 << 2;
        const SMUL  = 1 << 3;
        const BLINK = 1 << 4;
        const REV   = 1 << 5;
        const SMSO  = 1 << 6;
        const RMSO  = 1 << 7;
        const SITM  = 1 << 8;
        const RITM  = 1 << 9;
        const SSUBM = 1 << 10;
        const RSUBM = 1 << 11;
        const SSUPM = 1 << 12;
        const RSUPM = 1 << 13;
        const SETAB = 1 << 14;
        const SETAF = 1 << 15;

        /// Attribute capabilities of a plain VT100-class terminal.
        const VT100 = Self::SGR0.bits() | Self::SGR.bits() | Self::BOLD.bits()
            | Self::SMUL.bits() | Self::BLINK.bits() | Self::REV.bits()
            | Self::SMSO.bits() | Self::RMSO.bits();
        /// Both palette color capabilities.
        const COLOR = Self::SETAB.bits() | Self::SETAF.bits();
        /// Italics on and off.
        const ITALICS = Self::SITM.bits() | Self::RITM.bits();
    }
}

impl CapabilitySet {
    /// Whether the set includes `cap`.
    #[inline]
    #[must_use]
    pub const fn has(self, cap: Capability) -> bool {
        self.contains(cap.flag())
    }
}

// ─── CapabilityRequest ───────────────────────────────────────────────────────

/// A capability plus the integer parameters it should be expanded with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityRequest {
    /// Which capability.
    pub capability: Capability,
    /// Parameters in terminfo order (`%p1`, `%p2`, …).
    pub params: Vec<i32>,
}

impl CapabilityRequest {
    /// A request with no parameters.
    #[must_use]
    pub const fn new(capability: Capability) -> Self {
        Self {
            capability,
            params: Vec::new(),
        }
    }

    /// A request with parameters.
    #[must_use]
    pub fn with_params(capability: Capability, params: &[i32]) -> Self {
        Self {
            capability,
            params: params.to_vec(),
        }
    }

    /// Parameter `n` (1-based, like `%pN`), or 0 when absent.
    #[must_use]
    pub fn param(&self, n: usize) -> i32 {
        n.checked_sub(1)
            .and_then(|i| self.params.get(i))
            .copied()
            .unwrap_or(0)
    }
}

impl From<Capability> for CapabilityRequest {
    fn from(capability: Capability) -> Self {
        Self::new(capability)
    }
}

impl fmt::Display for CapabilityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.capability.capname())?;
        if !self.params.is_empty() {
            f.write_str("(")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{p}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

// ─── CapabilityProvider ──────────────────────────────────────────────────────

/// Resolves capability requests to control strings for one terminal type.
pub trait CapabilityProvider {
    /// Whether the terminal has `cap` at all.
    fn supports(&self, cap: Capability) -> bool;

    /// Expand `request` into the bytes to send, or `None` if the terminal
    /// lacks the capability or cannot express these parameters.
    fn expand(&self, request: &CapabilityRequest) -> Option<Vec<u8>>;
}

impl<P: CapabilityProvider + ?Sized> CapabilityProvider for &P {
    fn supports(&self, cap: Capability) -> bool {
        (**self).supports(cap)
    }

    fn expand(&self, request: &CapabilityRequest) -> Option<Vec<u8>> {
        (**self).expand(request)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capnames_are_unique() {
        for (i, a) in Capability::ALL.iter().enumerate() {
            for b in &Capability::ALL[i + 1..] {
                assert_ne!(a.capname(), b.capname());
            }
        }
    }

    #[test]
    fn every_capability_has_its_own_bit() {
        let all = Capability::ALL
            .iter()
            .fold(CapabilitySet::empty(), |acc, c| acc | c.flag());
        assert_eq!(all.bits().count_ones(), 16);
    }

    #[test]
    fn vt100_set_has_no_colors_or_italics() {
        let set = CapabilitySet::VT100;
        assert!(set.has(Capability::SetAttributes));
        assert!(set.has(Capability::EnterBoldMode));
        assert!(!set.has(Capability::SetAForeground));
        assert!(!set.has(Capability::EnterItalicsMode));
    }

    #[test]
    fn request_param_is_one_based() {
        let req = CapabilityRequest::with_params(Capability::SetAttributes, &[1, 0, 1]);
        assert_eq!(req.param(1), 1);
        assert_eq!(req.param(2), 0);
        assert_eq!(req.param(3), 1);
        assert_eq!(req.param(9), 0);
        assert_eq!(req.param(0), 0);
    }

    #[test]
    fn request_display() {
        assert_eq!(CapabilityRequest::new(Capability::EnterBoldMode).to_string(), "bold");
        assert_eq!(
            CapabilityRequest::with_params(Capability::SetAForeground, &[1]).to_string(),
            "setaf(1)"
        );
    }
}
