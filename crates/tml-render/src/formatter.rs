// SPDX-License-Identifier: MIT
//
// Line formatter — fixed-width hard wrapping of character data.
//
// Text arrives in arbitrary pieces and is split into three kinds of run:
//
//   graphic   printable, non-space characters. Written up to the room left
//             on the line; filling the line exactly breaks it, even in the
//             middle of a word.
//   spaces    literal U+0020. Dropped at column 0 so wrapped lines never
//             start with a blank; otherwise written up to the room left and
//             the rest thrown away.
//   other     newline breaks the line; CR, VT, tab and every other control
//             or whitespace character is discarded.
//
// Every character counts as one column. Wide and combining characters are
// not measured.
//
// The formatter knows nothing about styles. Callers pass `pad`, which says
// whether the active style has a background that a line break should
// carry out to the full width.

use std::io::{self, Write};

use tml_term::output::OutputSink;

// ─── LineEnding ──────────────────────────────────────────────────────────────

/// Line terminator written by a line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`, for a cooked terminal, a pipe or a file.
    #[default]
    Lf,
    /// `\r\n`, for a terminal with output post-processing turned off.
    CrLf,
}

impl LineEnding {
    /// The terminator bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

// ─── ColumnState ─────────────────────────────────────────────────────────────

/// Where output stands on the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnState {
    /// Characters written since the last line break.
    pub column: usize,
    /// Target line width. Never zero.
    pub width: usize,
    /// Width of the terminal, which may differ from `width`.
    pub terminal_width: usize,
    /// Line breaks performed so far.
    pub lines: u64,
}

// ─── LineFormatter ───────────────────────────────────────────────────────────

/// Splits text into lines of at most `width` characters.
#[derive(Debug, Clone)]
pub struct LineFormatter {
    state: ColumnState,
    ending: LineEnding,
}

/// Characters that occupy a column.
#[inline]
fn is_printable(c: char) -> bool {
    !c.is_whitespace() && !c.is_control()
}

/// Split `s` after its first `n` characters.
fn split_chars(s: &str, n: usize) -> (&str, &str) {
    let at = s.char_indices().nth(n).map_or(s.len(), |(i, _)| i);
    s.split_at(at)
}

impl LineFormatter {
    /// A formatter at column 0. A `width` of zero is treated as one.
    #[must_use]
    pub fn new(width: usize, terminal_width: usize, ending: LineEnding) -> Self {
        Self {
            state: ColumnState {
                column: 0,
                width: width.max(1),
                terminal_width,
                lines: 0,
            },
            ending,
        }
    }

    /// Current position and counters.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ColumnState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn column(&self) -> usize {
        self.state.column
    }

    #[inline]
    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.state.lines
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.state.width
    }

    #[inline]
    #[must_use]
    pub const fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Columns left on the current line.
    #[inline]
    const fn room(&self) -> usize {
        self.state.width.saturating_sub(self.state.column)
    }

    /// Format a piece of character data.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `sink`.
    pub fn write_text<W: Write>(
        &mut self,
        sink: &mut OutputSink<W>,
        text: &str,
        pad: bool,
    ) -> io::Result<()> {
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            if is_printable(c) {
                let end = rest.find(|c: char| !is_printable(c)).unwrap_or(rest.len());
                self.write_graphic(sink, &rest[..end], pad)?;
                rest = &rest[end..];
            } else if c == ' ' {
                let end = rest.find(|c: char| c != ' ').unwrap_or(rest.len());
                self.write_spaces(sink, end)?;
                rest = &rest[end..];
            } else {
                if c == '\n' {
                    self.line_break(sink, pad)?;
                }
                rest = &rest[c.len_utf8()..];
            }
        }
        Ok(())
    }

    fn write_graphic<W: Write>(
        &mut self,
        sink: &mut OutputSink<W>,
        mut run: &str,
        pad: bool,
    ) -> io::Result<()> {
        while !run.is_empty() {
            let room = self.room();
            let (head, tail) = split_chars(run, room);
            let taken = head.chars().count();
            if taken > 0 {
                sink.write_bytes(head.as_bytes())?;
                self.state.column += taken;
            }
            if taken == room {
                self.line_break(sink, pad)?;
            }
            run = tail;
        }
        Ok(())
    }

    fn write_spaces<W: Write>(&mut self, sink: &mut OutputSink<W>, count: usize) -> io::Result<()> {
        if self.state.column == 0 {
            return Ok(());
        }
        let emit = count.min(self.room());
        if emit < count {
            tracing::trace!(dropped = count - emit, "space overflow");
        }
        sink.write_repeated(b' ', emit)?;
        self.state.column += emit;
        Ok(())
    }

    /// End the current line.
    ///
    /// With `pad`, the rest of the line is filled with spaces first so the
    /// active background reaches the target width.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to or flushing `sink`.
    pub fn line_break<W: Write>(&mut self, sink: &mut OutputSink<W>, pad: bool) -> io::Result<()> {
        tracing::debug!(
            line = self.state.lines,
            column = self.state.column,
            "line break"
        );
        if pad {
            sink.write_repeated(b' ', self.room())?;
        }
        sink.write_bytes(self.ending.as_bytes())?;
        sink.flush()?;
        self.state.lines += 1;
        self.state.column = 0;
        Ok(())
    }

    /// Break the last line if anything was written on it.
    ///
    /// Returns whether a break was performed.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to or flushing `sink`.
    pub fn finish<W: Write>(&mut self, sink: &mut OutputSink<W>, pad: bool) -> io::Result<bool> {
        if self.state.column == 0 {
            return Ok(false);
        }
        self.line_break(sink, pad)?;
        Ok(true)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
