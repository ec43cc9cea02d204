// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode with scoped restore, and descriptor queries.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ) and isatty. These are the standard POSIX
// interfaces for terminal control. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Raw mode is a process-wide side effect on the output device: once it is
// applied, it must be undone on every exit path. `RawMode` is the scoped
// acquisition of that side effect. The happy path calls `restore()` and gets
// to report a teardown failure; every other path (an early `?` return, a
// panic unwinding through the caller) restores best-effort in `Drop`.
//
// The renderer only needs raw mode for one reason: with output
// post-processing off the device no longer turns `\n` into `\r\n`, so the
// line formatter must emit the carriage return itself.

use std::io;

#[cfg(unix)]
use std::os::unix::io::RawFd;

/// Descriptor type used by the queries in this module.
#[cfg(unix)]
pub type Fd = RawFd;

/// Descriptor type used by the queries in this module.
#[cfg(not(unix))]
pub type Fd = i32;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Whether `fd` refers to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty(fd: Fd) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty(_fd: Fd) -> bool {
    false
}

/// Window width in columns of the terminal behind `fd`, via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if `fd` is not a terminal or reports a zero width.
#[cfg(unix)]
#[must_use]
pub fn window_width(fd: Fd) -> Option<u16> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Some(ws.ws_col)
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn window_width(_fd: Fd) -> Option<u16> {
    None
}

// ─── RawMode ─────────────────────────────────────────────────────────────────

/// Raw terminal mode on one descriptor, restored when the guard ends.
///
/// # Example
///
/// ```no_run
/// use tml_term::terminal::RawMode;
///
/// let guard = RawMode::enable(1)?;
/// // ... write output with explicit "\r\n" line endings ...
/// guard.restore()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RawMode {
    fd: Fd,
    /// Settings to put back. `None` once restored, or for an inactive guard.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// A guard that holds nothing and restores nothing.
    ///
    /// Used when raw mode was not requested or the output is not a terminal,
    /// so callers can treat both cases uniformly.
    #[must_use]
    pub const fn inactive() -> Self {
        Self {
            fd: -1,
            #[cfg(unix)]
            original: None,
        }
    }

    /// Put the terminal behind `fd` into raw mode.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the current settings cannot be read (for
    /// example `fd` is not a terminal) or the raw settings cannot be applied.
    /// Nothing needs restoring when this fails.
    #[cfg(unix)]
    pub fn enable(fd: Fd) -> io::Result<Self> {
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            let original = termios;

            // cfmakeraw equivalent: disable all line processing.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSANOW, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            tracing::debug!(fd, "raw mode enabled");
            Ok(Self {
                fd,
                original: Some(original),
            })
        }
    }

    /// Raw mode is unavailable off unix.
    ///
    /// # Errors
    ///
    /// Always returns `Unsupported`.
    #[cfg(not(unix))]
    pub fn enable(_fd: Fd) -> io::Result<Self> {
        Err(io::ErrorKind::Unsupported.into())
    }

    /// Whether this guard still has settings to restore.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.original.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Put the original settings back and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `tcsetattr`. The guard is consumed either
    /// way; a failed restore is not retried on drop.
    pub fn restore(mut self) -> io::Result<()> {
        self.restore_now()
    }

    #[cfg(unix)]
    fn restore_now(&mut self) -> io::Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        unsafe {
            if libc::tcsetattr(self.fd, libc::TCSANOW, &raw const original) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        tracing::debug!(fd = self.fd, "raw mode restored");
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unnecessary_wraps)]
    fn restore_now(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore_now() {
            tracing::warn!(fd = self.fd, error = %e, "failed to restore terminal settings");
        }
    }
}

impl std::fmt::Debug for RawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMode")
            .field("fd", &self.fd)
            .field("active", &self.is_active())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_descriptor_is_not_a_tty() {
        assert!(!is_tty(-1));
    }

    #[test]
    fn invalid_descriptor_has_no_width() {
        assert_eq!(window_width(-1), None);
    }

    #[test]
    fn window_width_on_stdout_does_not_panic() {
        let _ = window_width(1);
    }

    #[test]
    fn enable_on_non_terminal_fails() {
        assert!(RawMode::enable(-1).is_err());
    }

    #[test]
    fn inactive_guard_restores_nothing() {
        let guard = RawMode::inactive();
        assert!(!guard.is_active());
        guard.restore().unwrap();
    }

    #[test]
    fn inactive_guard_drops_quietly() {
        drop(RawMode::inactive());
    }

    #[test]
    fn debug_shows_state() {
        let s = format!("{:?}", RawMode::inactive());
        assert!(s.contains("active: false"));
    }
}
