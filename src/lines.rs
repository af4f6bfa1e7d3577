//! Line-oriented reading with line number tracking.
//!
//! The header parser and the record decoder consume one stream in sequence;
//! both read through a [`LineReader`] so errors can name the exact line.

use crate::error::Result;
use std::io::BufRead;

/// Buffered line reader that counts lines and tolerates non-UTF-8 bytes
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    bytes: Vec<u8>,
    text: String,
    lines_read: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes: Vec::with_capacity(256),
            text: String::with_capacity(256),
            lines_read: 0,
        }
    }

    /// Read the next line without its terminator.
    ///
    /// Returns the 1-based line number with the text, or `None` at end of
    /// input. Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn next_line(&mut self) -> Result<Option<(usize, &str)>> {
        self.bytes.clear();
        if self.inner.read_until(b'\n', &mut self.bytes)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;

        while matches!(self.bytes.last(), Some(b'\n' | b'\r')) {
            self.bytes.pop();
        }

        self.text.clear();
        self.text.push_str(&String::from_utf8_lossy(&self.bytes));
        Ok(Some((self.lines_read, self.text.as_str())))
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}
