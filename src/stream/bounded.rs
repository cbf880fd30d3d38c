//! Bounded sub-range view over a seekable stream.

use std::io::{self, Read, Seek, SeekFrom};

/// Restricts a parent stream to the byte range `[start, start + length)`.
///
/// The view reads at most `length` bytes from the parent, starting at
/// `start`, then reports end-of-stream no matter how much more data the
/// parent holds. It positions the parent before every read, so the parent
/// cursor may be moved freely between reads without corrupting the view.
///
/// The view borrows only the parent's read cursor during active reads; it
/// takes ownership of the handle but makes no assumption about what else
/// the underlying file is shared with, which is why it never relies on the
/// cursor staying where a previous read left it.
///
/// Parent I/O errors propagate unmasked.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    start: u64,
    length: u64,
    consumed: u64,
}

impl<R: Read + Seek> BoundedReader<R> {
    /// Creates a view over `[start, start + length)` of `inner`.
    pub fn new(inner: R, start: u64, length: u64) -> Self {
        Self {
            inner,
            start,
            length,
            consumed: 0,
        }
    }

    /// Total length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Returns true if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Bytes not yet delivered from the range.
    pub fn remaining(&self) -> u64 {
        self.length - self.consumed
    }

    /// Consumes the view, returning the parent stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        self.inner.seek(SeekFrom::Start(self.start + self.consumed))?;
        let n = self.inner.read(&mut buf[..want])?;
        self.consumed += n as u64;
        Ok(n)
    }
}
