// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Output sink — decides *when* bytes reach the device, never *what* they are.
//
// Two modes, fixed at construction:
//
//   Buffered — writes land in a `BufWriter` and reach the device on flush.
//   The renderer flushes after every markup event and every line break, so
//   a slow producer still sees output promptly while each event costs at
//   most one write syscall.
//
//   Raw — every write goes straight to the underlying writer in a loop that
//   retries `WouldBlock` and `Interrupted`. Flush is a no-op because there
//   is nothing held back. For standard output this is paired with
//   `FdWriter`, which calls write(2) on the descriptor and so also bypasses
//   the line buffering inside `std::io::Stdout`.

use std::io::{self, BufWriter, Write};

/// Spaces (or any repeated byte) are written in chunks of this size.
const REPEAT_CHUNK: usize = 64;

// ─── OutputMode ──────────────────────────────────────────────────────────────

/// Buffering policy of an [`OutputSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Writes are buffered until [`OutputSink::flush`].
    #[default]
    Buffered,
    /// Writes go directly to the device; flush does nothing.
    Raw,
}

// ─── OutputSink ──────────────────────────────────────────────────────────────

enum Inner<W: Write> {
    Buffered(BufWriter<W>),
    Raw(W),
}

/// Byte sink shared by the style emitter and the line formatter.
///
/// # Example
///
/// ```
/// use tml_term::output::{OutputMode, OutputSink};
///
/// let mut sink = OutputSink::new(Vec::new(), OutputMode::Raw);
/// sink.write_bytes(b"hello")?;
/// sink.write_repeated(b' ', 3)?;
/// assert_eq!(sink.get_ref().as_slice(), b"hello   ");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct OutputSink<W: Write> {
    inner: Inner<W>,
    bytes_written: u64,
}

impl<W: Write> OutputSink<W> {
    /// Wrap `writer` with the given buffering policy.
    pub fn new(writer: W, mode: OutputMode) -> Self {
        let inner = match mode {
            OutputMode::Buffered => Inner::Buffered(BufWriter::new(writer)),
            OutputMode::Raw => Inner::Raw(writer),
        };
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// The buffering policy chosen at construction.
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        match self.inner {
            Inner::Buffered(_) => OutputMode::Buffered,
            Inner::Raw(_) => OutputMode::Raw,
        }
    }

    /// Total bytes accepted so far (buffered or not).
    #[inline]
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// The underlying writer. Buffered bytes not yet flushed are not in it.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        match &self.inner {
            Inner::Buffered(b) => b.get_ref(),
            Inner::Raw(w) => w,
        }
    }

    /// Write all of `buf`.
    ///
    /// # Errors
    ///
    /// Returns any write error other than the retryable `WouldBlock` and
    /// `Interrupted` conditions in raw mode.
    pub fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        match &mut self.inner {
            Inner::Buffered(b) => b.write_all(buf)?,
            Inner::Raw(w) => write_all_retrying(w, buf)?,
        }
        self.bytes_written += buf.len() as u64;
        Ok(())
    }

    /// Write `byte` `count` times.
    ///
    /// # Errors
    ///
    /// Same as [`write_bytes`](Self::write_bytes).
    pub fn write_repeated(&mut self, byte: u8, count: usize) -> io::Result<()> {
        let chunk = [byte; REPEAT_CHUNK];
        let mut left = count;
        while left > 0 {
            let n = left.min(REPEAT_CHUNK);
            self.write_bytes(&chunk[..n])?;
            left -= n;
        }
        Ok(())
    }

    /// Push buffered bytes to the device. A no-op in raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffered write or the device flush fails.
    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            Inner::Buffered(b) => b.flush(),
            Inner::Raw(_) => Ok(()),
        }
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing buffered bytes fails.
    pub fn into_inner(self) -> io::Result<W> {
        match self.inner {
            Inner::Buffered(b) => b.into_inner().map_err(io::IntoInnerError::into_error),
            Inner::Raw(w) => Ok(w),
        }
    }
}

impl<W: Write> Write for OutputSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Self::flush(self)
    }
}

/// `write_all` that treats `WouldBlock` and `Interrupted` as "try again".
fn write_all_retrying(w: &mut impl Write, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match w.write(buf) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

// ─── FdWriter ────────────────────────────────────────────────────────────────

/// Unbuffered writer over a raw file descriptor.
///
/// Each `write` is one write(2) call. Errors come back as
/// `io::Error::last_os_error()`, so `EAGAIN` surfaces as `WouldBlock` and
/// the raw sink retries it.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdWriter {
    fd: libc::c_int,
}

#[cfg(unix)]
impl FdWriter {
    /// Writer for an arbitrary descriptor. The descriptor is not closed on drop.
    #[must_use]
    pub const fn new(fd: libc::c_int) -> Self {
        Self { fd }
    }

    /// Writer for standard output (fd 1).
    #[must_use]
    pub const fn stdout() -> Self {
        Self::new(libc::STDOUT_FILENO)
    }

    /// The wrapped descriptor.
    #[must_use]
    pub const fn fd(&self) -> libc::c_int {
        self.fd
    }
}

#[cfg(unix)]
impl Write for FdWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: `buf` is a valid, initialized slice for its whole length.
        let n = unsafe { libc::write(self.fd, buf.as_ptr().cast::<libc::c_void>(), buf.len()) };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
