//! Line framing over a timed-out byte stream
//!
//! Serial reads return whatever has arrived so far. [`LineReader`] keeps
//! the bytes after the last `\n` until the rest of the line shows up, so
//! a record is only ever produced from a complete line.

use std::io::{ErrorKind, Read};

const READ_CHUNK: usize = 256;

/// Longest line accepted before giving up on finding a terminator
pub const MAX_LINE: usize = 64 * 1024;

/// Result of one poll of the device
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One complete line, terminator removed
    Line(Vec<u8>),
    /// The read timed out without completing a line
    Idle,
    /// The device reported end of stream
    Closed,
    /// More than the line limit arrived without a `\n`; the bytes were dropped
    TooLong(usize),
}

pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    chunk: [u8; READ_CHUNK],
    max_line: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            chunk: [0; READ_CHUNK],
            max_line: MAX_LINE,
        }
    }

    /// Override the line length limit
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    /// Return the next buffered line, or read once from the device
    pub fn poll_line(&mut self) -> std::io::Result<ReadOutcome> {
        if let Some(line) = self.take_line() {
            return Ok(ReadOutcome::Line(line));
        }

        match self.inner.read(&mut self.chunk) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => {
                self.pending.extend_from_slice(&self.chunk[..n]);
                if let Some(line) = self.take_line() {
                    return Ok(ReadOutcome::Line(line));
                }
                if self.pending.len() > self.max_line {
                    let dropped = self.pending.len();
                    self.pending.clear();
                    return Ok(ReadOutcome::TooLong(dropped));
                }
                Ok(ReadOutcome::Idle)
            }
            Err(ref e) if e.kind() == ErrorKind::TimedOut => Ok(ReadOutcome::Idle),
            // EINTR from the Ctrl+C signal; the caller re-checks its stop flag
            Err(ref e) if e.kind() == ErrorKind::Interrupted => Ok(ReadOutcome::Idle),
            Err(e) => Err(e),
        }
    }

    /// Bytes received after the last complete line
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Complete lines already read from the device but not yet returned
    pub fn drain_lines(&mut self) -> Vec<Vec<u8>> {
        std::iter::from_fn(|| self.take_line()).collect()
    }

    /// Drop any partial line and hand back the device
    pub fn into_inner(self) -> R {
        if !self.pending().is_empty() {
            log::debug!("Discarding {} bytes of partial line", self.pending().len());
        }
        self.inner
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        Some(line)
    }
}
