// SPDX-License-Identifier: MIT
//
// tml-render — Rendering engine for tml-tty.
//
// Turns a stream of markup events into terminal output. The pieces, leaves
// first:
//
//   style     → StyleState, StyleFlags, attribute overrides
//   stack     → the LIFO stack of active styles that mirrors tag nesting
//   diff      → style transition → minimal list of capability requests
//   formatter → column tracking, hard wrapping, background padding
//   tag       → closed vocabulary of known tags
//   engine    → the Renderer that ties them together per run
//   markup    → the XML event source that drives a MarkupHandler
//
// Escape sequences never appear in this crate. Every control string comes
// from a `CapabilityProvider`, so the same engine drives a 256-color xterm,
// a VT100, or a dumb terminal that gets plain text.

pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod markup;
pub mod stack;
pub mod style;
pub mod tag;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{RenderStats, Renderer};
pub use error::{Error, Result};
