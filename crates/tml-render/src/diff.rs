// SPDX-License-Identifier: MIT
//
// Style diff — turn a style transition into capability requests.
//
// This is where the terminal's awkward corners live:
//
//   - Bold, underline, blink and reverse have no individual exit
//     capability. Turning one of them off needs either `sgr` (which sets
//     the whole attribute group at once) or a full `sgr0` reset.
//
//   - Default colors are not palette entries. The only way back to the
//     terminal's default background or foreground is `sgr0`.
//
//   - After a reset every attribute is already off, so no exit call is
//     issued for italic, standout, subscript or superscript.
//
//   - When the terminal has `sgr` and more than one of the no-exit group
//     is on (or one is being cleared), a single `sgr` call replaces the
//     individual enters.
//
// Colors are re-sent on every transition in which they are non-default,
// changed or not, because any reset earlier in the same transition (or a
// `sgr`, which starts with SGR 0 on most terminals) has wiped them.
//
// `plan_transition` is pure: the same pair always yields the same list.
// `emit_transition` resolves that list through a provider and writes it.

use std::io::{self, Write};

use tml_term::capability::{Capability, CapabilityProvider, CapabilityRequest};
use tml_term::output::OutputSink;

use crate::style::{StyleFlags, StyleState};

/// Toggleable attributes that have both an enter and an exit capability,
/// in emission order.
const TOGGLES: [(StyleFlags, Capability, Capability); 4] = [
    (
        StyleFlags::ITALIC,
        Capability::EnterItalicsMode,
        Capability::ExitItalicsMode,
    ),
    (
        StyleFlags::STANDOUT,
        Capability::EnterStandoutMode,
        Capability::ExitStandoutMode,
    ),
    (
        StyleFlags::SUBSCRIPT,
        Capability::EnterSubscriptMode,
        Capability::ExitSubscriptMode,
    ),
    (
        StyleFlags::SUPERSCRIPT,
        Capability::EnterSuperscriptMode,
        Capability::ExitSuperscriptMode,
    ),
];

/// Attributes without an exit capability, in individual-enter order.
const ENTER_ONLY: [(StyleFlags, Capability); 4] = [
    (StyleFlags::BOLD, Capability::EnterBoldMode),
    (StyleFlags::UNDERLINE, Capability::EnterUnderlineMode),
    (StyleFlags::BLINK, Capability::EnterBlinkMode),
    (StyleFlags::REVERSE, Capability::EnterReverseMode),
];

// ─── Planning ────────────────────────────────────────────────────────────────

/// Plan the capability requests that move the terminal from `old` to `new`.
///
/// `None` on either side means "no style": as an `old` it means nothing is
/// known about the terminal's state, as a `new` it means a full reset.
/// `has_set_attributes` is whether the terminal provides `sgr`.
#[must_use]
pub fn plan_transition(
    old: Option<&StyleState>,
    new: Option<&StyleState>,
    has_set_attributes: bool,
) -> Vec<CapabilityRequest> {
    let mut plan = Vec::new();

    // A no-exit attribute is being turned off.
    let clearing = match (old, new) {
        (Some(o), Some(n)) => o.flags.intersects(StyleFlags::NO_EXIT - n.flags),
        _ => false,
    };

    let mut reset = clearing && !has_set_attributes;
    if let Some(n) = new {
        if n.background.is_default() && old.is_none_or(|o| !o.background.is_default()) {
            reset = true;
        }
        if n.foreground.is_default() && old.is_none_or(|o| !o.foreground.is_default()) {
            reset = true;
        }
    }
    if old.is_none() && new.is_none() {
        reset = true;
    }

    if reset {
        plan.push(Capability::ExitAttributeMode.into());
    }

    let Some(n) = new else {
        return plan;
    };

    let enter_only = n.flags & StyleFlags::NO_EXIT;
    if has_set_attributes && (clearing || enter_only.bits().count_ones() > 1) {
        let p = |flag| i32::from(n.has(flag));
        plan.push(CapabilityRequest::with_params(
            Capability::SetAttributes,
            &[
                p(StyleFlags::STANDOUT),
                p(StyleFlags::UNDERLINE),
                p(StyleFlags::REVERSE),
                p(StyleFlags::BLINK),
                0,
                p(StyleFlags::BOLD),
                0,
                0,
                0,
            ],
        ));
    } else {
        for (flag, enter) in ENTER_ONLY {
            if n.has(flag) {
                plan.push(enter.into());
            }
        }
        // Reverse also enters standout here. Kept as-is; see
        // `reverse_without_sgr_also_enters_standout`.
        if n.has(StyleFlags::REVERSE) {
            plan.push(Capability::EnterStandoutMode.into());
        }
    }

    for (flag, enter, exit) in TOGGLES {
        let was_on = old.is_none_or(|o| o.has(flag));
        if n.has(flag) && !old.is_some_and(|o| o.has(flag)) {
            plan.push(enter.into());
        } else if was_on && !reset {
            plan.push(exit.into());
        }
    }

    if !n.background.is_default() {
        plan.push(CapabilityRequest::with_params(
            Capability::SetABackground,
            &[n.background.index()],
        ));
    }
    if !n.foreground.is_default() {
        plan.push(CapabilityRequest::with_params(
            Capability::SetAForeground,
            &[n.foreground.index()],
        ));
    }

    plan
}

// ─── Emission ────────────────────────────────────────────────────────────────

/// Plan the transition from `old` to `new`, resolve it through `provider`
/// and write the control strings to `sink`.
///
/// Requests the provider cannot satisfy are skipped. Returns how many
/// control strings were written.
///
/// # Errors
///
/// Returns an error only if writing to `sink` fails.
pub fn emit_transition<P, W>(
    provider: &P,
    sink: &mut OutputSink<W>,
    old: Option<&StyleState>,
    new: Option<&StyleState>,
) -> io::Result<usize>
where
    P: CapabilityProvider + ?Sized,
    W: Write,
{
    let plan = plan_transition(old, new, provider.supports(Capability::SetAttributes));
    let mut written = 0;
    for request in &plan {
        match provider.expand(request) {
            Some(bytes) => {
                tracing::trace!(%request, "emit");
                sink.write_bytes(&bytes)?;
                written += 1;
            }
            None => tracing::trace!(%request, "unavailable"),
        }
    }
    Ok(written)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
