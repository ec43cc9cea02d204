// SPDX-License-Identifier: MIT
//
// Error type for a rendering run.
//
// Only real failures are errors: unreadable input, unwritable output,
// malformed markup, an unusable terminal. Vocabulary mismatches (unknown
// tags, attributes, color names, boolean tokens) are decoded to defaults
// and never reach this type.

use std::io;

use thiserror::Error;

/// Everything that can abort a rendering run.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not well-formed markup.
    #[error("markup error at byte {position}: {message}")]
    Markup { position: u64, message: String },

    /// No built-in profile matches the terminal type.
    #[error("unknown terminal type: {0}")]
    UnknownTerminal(String),

    /// Neither `--term` nor `$TERM` named a terminal.
    #[error("terminal type not set (use --term or set TERM)")]
    MissingTerminal,

    /// Raw mode could not be applied.
    #[error("terminal setup failed: {0}")]
    TerminalSetup(#[source] io::Error),

    /// Raw mode could not be undone.
    #[error("terminal restore failed: {0}")]
    TerminalRestore(#[source] io::Error),
}

impl Error {
    /// Build a markup error at `position`.
    pub fn markup(position: u64, message: impl Into<String>) -> Self {
        Self::Markup {
            position,
            message: message.into(),
        }
    }
}

/// Result alias for rendering operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_error_message_includes_position() {
        let e = Error::markup(17, "mismatched tag");
        assert_eq!(e.to_string(), "markup error at byte 17: mismatched tag");
    }

    #[test]
    fn io_error_converts() {
        let e: Error = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn terminal_errors_display() {
        assert_eq!(
            Error::UnknownTerminal("hp2621".into()).to_string(),
            "unknown terminal type: hp2621"
        );
        assert!(Error::MissingTerminal.to_string().contains("TERM"));
    }
}
