// SPDX-License-Identifier: MIT
//
// Render options — line width and line ending for one run.
//
// Width resolution is kept apart from any terminal query so it can be
// tested on plain numbers: the binary asks the terminal layer, this module
// decides what the answers mean.

use crate::formatter::LineEnding;

/// Line width used when nothing else gives one.
pub const DEFAULT_WIDTH: usize = 80;

/// Settings for a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Target line width. Never zero once built by [`RenderOptions::resolve`].
    pub width: usize,
    /// Width of the terminal; informational.
    pub terminal_width: usize,
    /// Terminator written by each line break.
    pub line_ending: LineEnding,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            terminal_width: DEFAULT_WIDTH,
            line_ending: LineEnding::Lf,
        }
    }
}

/// What is known about the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputDevice {
    /// The output is a terminal.
    pub is_tty: bool,
    /// Columns reported by the terminal, if it answered.
    pub window_width: Option<u16>,
    /// Column count from the terminal's profile.
    pub profile_columns: u16,
}

/// Width of the terminal as far as rendering is concerned.
///
/// A terminal's own window width wins over the profile. A cooked terminal
/// gives up its last column, so text never lands in the position where
/// some terminals wrap on their own.
#[must_use]
pub fn terminal_width(device: OutputDevice, raw: bool) -> usize {
    let columns = if device.is_tty {
        device.window_width.unwrap_or(device.profile_columns)
    } else {
        device.profile_columns
    };
    let columns = usize::from(columns);
    if device.is_tty && !raw {
        columns.saturating_sub(1)
    } else {
        columns
    }
}

/// Line width: the override if positive, else the terminal width if
/// positive, else [`DEFAULT_WIDTH`].
#[must_use]
pub const fn output_width(requested: usize, terminal_width: usize) -> usize {
    if requested > 0 {
        requested
    } else if terminal_width > 0 {
        terminal_width
    } else {
        DEFAULT_WIDTH
    }
}

impl RenderOptions {
    /// Resolve options from the command-line width override (`0` for none),
    /// the output device and whether raw mode is in effect.
    #[must_use]
    pub fn resolve(requested_width: usize, device: OutputDevice, raw: bool) -> Self {
        let terminal_width = terminal_width(device, raw);
        Self {
            width: output_width(requested_width, terminal_width),
            terminal_width,
            line_ending: if raw { LineEnding::CrLf } else { LineEnding::Lf },
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
