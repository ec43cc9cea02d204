// SPDX-License-Identifier: MIT
//
// Style stack — strictly LIFO, owned states, one entry per open style tag.
//
// The stack starts with the sentinel base state already in place, so it is
// never empty while markup is being processed. Each push clones the current
// top, applies overrides and stamps a fresh identifier; each pop hands back
// both ends of the transition so the caller can diff-emit it immediately.
// After the matching pop, the top is the very value that was on top before
// the push, so nested scopes restore their parent exactly.

use crate::style::{StyleOverrides, StyleState};

// ─── Transition ──────────────────────────────────────────────────────────────

/// The two ends of a style change. `None` means "no style at all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the change.
    pub old: Option<StyleState>,
    /// State after the change.
    pub new: Option<StyleState>,
}

// ─── StyleStack ──────────────────────────────────────────────────────────────

/// Stack of active styles.
#[derive(Debug, Clone)]
pub struct StyleStack {
    states: Vec<StyleState>,
    next_id: u64,
}

impl StyleStack {
    /// A stack holding only the sentinel base state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![StyleState::BASE],
            next_id: 1,
        }
    }

    /// The active style, if any.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&StyleState> {
        self.states.last()
    }

    /// Number of states, sentinel included.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.states.len()
    }

    /// Push a clone of the top with `overrides` applied.
    ///
    /// On an empty stack the clone starts from the base state and the
    /// transition's `old` end is `None`.
    pub fn push(&mut self, overrides: &StyleOverrides) -> Transition {
        let old = self.top().copied();
        let mut new = overrides.applied_to(old.unwrap_or(StyleState::BASE));
        new.id = self.next_id;
        self.next_id += 1;
        self.states.push(new);
        Transition {
            old,
            new: Some(new),
        }
    }

    /// Remove the top. Returns `None` if the stack was already empty.
    pub fn pop(&mut self) -> Option<Transition> {
        let popped = self.states.pop()?;
        Some(Transition {
            old: Some(popped),
            new: self.top().copied(),
        })
    }
}

impl Default for StyleStack {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleFlags;
    use tml_term::color::Color;

    fn bold() -> StyleOverrides {
        StyleOverrides::new().flag(StyleFlags::BOLD, true)
    }

    #[test]
    fn starts_with_sentinel() {
        let stack = StyleStack::new();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.top(), Some(&StyleState::BASE));
    }

    #[test]
    fn push_clones_top_and_applies() {
        let mut stack = StyleStack::new();
        stack.push(&StyleOverrides::new().foreground(Color::Indexed(1)));
        let t = stack.push(&bold());
        let new = t.new.unwrap();
        assert_eq!(new.foreground, Color::Indexed(1));
        assert!(new.has(StyleFlags::BOLD));
        assert_eq!(t.old.unwrap().foreground, Color::Indexed(1));
        assert!(!t.old.unwrap().has(StyleFlags::BOLD));
    }

    #[test]
    fn ids_increase_monotonically() {
        let mut stack = StyleStack::new();
        let a = stack.push(&bold()).new.unwrap().id;
        let b = stack.push(&bold()).new.unwrap().id;
        stack.pop();
        let c = stack.push(&bold()).new.unwrap().id;
        assert!(a < b && b < c);
    }

    #[test]
    fn pop_restores_exact_parent() {
        let mut stack = StyleStack::new();
        stack.push(&StyleOverrides::new().background(Color::Indexed(4)));
        let before = *stack.top().unwrap();

        stack.push(&bold());
        stack.push(&StyleOverrides::new().foreground(Color::Indexed(3)));
        stack.pop();
        stack.pop();

        assert_eq!(*stack.top().unwrap(), before);
    }

    #[test]
    fn pop_reports_both_ends() {
        let mut stack = StyleStack::new();
        let pushed = stack.push(&bold()).new;
        let t = stack.pop().unwrap();
        assert_eq!(t.old, pushed);
        assert_eq!(t.new, Some(StyleState::BASE));
    }

    #[test]
    fn popping_sentinel_ends_in_absent() {
        let mut stack = StyleStack::new();
        let t = stack.pop().unwrap();
        assert_eq!(t.old, Some(StyleState::BASE));
        assert_eq!(t.new, None);
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn push_on_empty_starts_from_base() {
        let mut stack = StyleStack::new();
        stack.pop();
        let t = stack.push(&bold());
        assert_eq!(t.old, None);
        assert_eq!(t.new.unwrap().flags, StyleFlags::BOLD);
    }

    #[test]
    fn deep_nesting_round_trip() {
        let mut stack = StyleStack::new();
        let mut seen = Vec::new();
        for i in 0..50 {
            seen.push(*stack.top().unwrap());
            stack.push(&StyleOverrides::new().foreground(Color::Indexed(i % 8)));
        }
        while let Some(expected) = seen.pop() {
            stack.pop();
            assert_eq!(*stack.top().unwrap(), expected);
        }
        assert_eq!(stack.depth(), 1);
    }
}
