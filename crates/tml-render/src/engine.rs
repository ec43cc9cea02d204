// SPDX-License-Identifier: MIT
//
// Renderer — one rendering run from markup events to terminal bytes.
//
// The renderer owns everything mutable about a run: the style stack, the
// line formatter and the output sink. Markup events come in through the
// `MarkupHandler` implementation and are fully handled (control strings
// emitted, text wrapped, sink flushed) before the call returns.
//
// Lifecycle:
//
//   new()      sentinel base style on the stack, nothing emitted
//   events     style tags push and pop, text is formatted
//   finish()   sentinel popped, last line broken, sink flushed
//
// Style changes are emitted at the moment the tag opens or closes, never
// lazily before the next text, so an element with no content still
// produces its enter and exit sequences.

use std::io::{self, Write};

use tml_term::capability::CapabilityProvider;
use tml_term::output::OutputSink;

use crate::config::RenderOptions;
use crate::diff::emit_transition;
use crate::formatter::LineFormatter;
use crate::markup::MarkupHandler;
use crate::stack::{StyleStack, Transition};
use crate::style::{StyleOverrides, StyleState};
use crate::tag::Tag;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Line breaks written.
    pub lines: u64,
    /// Bytes written to the output.
    pub bytes: u64,
    /// Styles pushed, sentinel excluded.
    pub pushes: u64,
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Markup-to-terminal renderer for a single run.
pub struct Renderer<P: CapabilityProvider, W: Write> {
    provider: P,
    sink: OutputSink<W>,
    stack: StyleStack,
    formatter: LineFormatter,
    pushes: u64,
}

impl<P: CapabilityProvider, W: Write> Renderer<P, W> {
    /// A renderer with the base style in place. Writes nothing.
    pub fn new(provider: P, sink: OutputSink<W>, options: RenderOptions) -> Self {
        tracing::debug!(
            width = options.width,
            terminal_width = options.terminal_width,
            ending = ?options.line_ending,
            "renderer ready"
        );
        Self {
            provider,
            sink,
            stack: StyleStack::new(),
            formatter: LineFormatter::new(
                options.width,
                options.terminal_width,
                options.line_ending,
            ),
            pushes: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn column(&self) -> usize {
        self.formatter.column()
    }

    #[inline]
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.formatter.lines()
    }

    /// Stack depth, sentinel included.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The active style.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&StyleState> {
        self.stack.top()
    }

    #[must_use]
    pub const fn sink(&self) -> &OutputSink<W> {
        &self.sink
    }

    /// Give up the output sink. Call [`finish`](Self::finish) first.
    pub fn into_sink(self) -> OutputSink<W> {
        self.sink
    }

    /// Whether a line break should pad out the active background.
    fn pad(&self) -> bool {
        self.stack
            .top()
            .is_some_and(|s| !s.background.is_default())
    }

    fn emit(&mut self, t: Transition) -> io::Result<()> {
        emit_transition(&self.provider, &mut self.sink, t.old.as_ref(), t.new.as_ref())?;
        Ok(())
    }

    fn push(&mut self, overrides: &StyleOverrides) -> io::Result<()> {
        let t = self.stack.push(overrides);
        self.pushes += 1;
        if let Some(new) = t.new {
            tracing::trace!(id = new.id, depth = self.stack.depth(), "push");
        }
        // Nothing is known about the terminal without a previous state.
        if t.old.is_some() {
            self.emit(t)?;
        }
        Ok(())
    }

    fn pop(&mut self) -> io::Result<()> {
        // The sentinel is only removed by `finish`.
        if self.stack.depth() <= 1 {
            tracing::warn!("end tag with no open style; ignored");
            return Ok(());
        }
        if let Some(t) = self.stack.pop() {
            self.emit(t)?;
        }
        Ok(())
    }

    fn line_break(&mut self) -> io::Result<()> {
        let pad = self.pad();
        self.formatter.line_break(&mut self.sink, pad)
    }

    /// End the run: drop the base style, break the last line if it has
    /// content, and flush.
    ///
    /// Calling it again only flushes.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to or flushing the sink.
    pub fn finish(&mut self) -> io::Result<RenderStats> {
        if let Some(t) = self.stack.pop() {
            self.emit(t)?;
        }
        let pad = self.pad();
        self.formatter.finish(&mut self.sink, pad)?;
        self.sink.flush()?;

        let stats = RenderStats {
            lines: self.formatter.lines(),
            bytes: self.sink.bytes_written(),
            pushes: self.pushes,
        };
        tracing::debug!(
            lines = stats.lines,
            bytes = stats.bytes,
            pushes = stats.pushes,
            "render finished"
        );
        Ok(stats)
    }
}

impl<P: CapabilityProvider, W: Write> MarkupHandler for Renderer<P, W> {
    fn start_element(&mut self, name: &str, attributes: &[(String, String)]) -> io::Result<()> {
        let tag = Tag::from_name(name);
        tracing::debug!(name, ?tag, column = self.column(), "start");
        match tag {
            Tag::Span => {
                let overrides = StyleOverrides::from_attributes(
                    attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                );
                self.push(&overrides)?;
            }
            Tag::Flag(flag) => self.push(&StyleOverrides::new().flag(flag, true))?,
            Tag::Foreground(color) => self.push(&StyleOverrides::new().foreground(color))?,
            Tag::Break => self.line_break()?,
            Tag::Paragraph => {
                if self.column() > 0 {
                    self.line_break()?;
                }
            }
            Tag::Placeholder | Tag::Root | Tag::Unknown => {}
        }
        self.sink.flush()
    }

    fn end_element(&mut self, name: &str) -> io::Result<()> {
        let tag = Tag::from_name(name);
        tracing::debug!(name, ?tag, column = self.column(), "end");
        if tag.is_style_scope() {
            self.pop()?;
        }
        self.sink.flush()
    }

    fn character_data(&mut self, text: &str) -> io::Result<()> {
        tracing::debug!(len = text.len(), column = self.column(), "text");
        let pad = self.pad();
        self.formatter.write_text(&mut self.sink, text, pad)?;
        self.sink.flush()
    }
}

impl<P: CapabilityProvider, W: Write> std::fmt::Debug for Renderer<P, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("depth", &self.stack.depth())
            .field("formatter", &self.formatter)
            .field("pushes", &self.pushes)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
