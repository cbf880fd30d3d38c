//! Line-oriented reading over any byte stream.

use std::io::{self, BufRead, BufReader, Read};

use crate::READ_BUFFER_SIZE;

/// Buffered, line-oriented view of a byte stream.
///
/// Wraps any [`Read`] in a [`BufReader`] and exposes the [`BufRead`] line
/// interface, so declaration files and scripts can be consumed line by line
/// regardless of whether they come from a pack entry or a loose file.
#[derive(Debug)]
pub struct TextReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> TextReader<R> {
    /// Creates a new line-oriented reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(READ_BUFFER_SIZE, inner),
        }
    }

    /// Reads one line (including the terminating newline, if present) into
    /// `buf`, returning the number of bytes read. Returns 0 at end of
    /// stream.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.inner.read_line(buf)
    }

    /// Returns an iterator over the lines of the stream, with line
    /// terminators stripped.
    pub fn lines(self) -> io::Lines<BufReader<R>> {
        self.inner.lines()
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Consumes the view, returning the underlying reader.
    ///
    /// Buffered but unread bytes are discarded.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> Read for TextReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> BufRead for TextReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}
