//! Streaming inflate of raw deflate data.

use std::io::{self, Read};

use flate2::{Decompress, FlushDecompress, Status};

use crate::Error;
use crate::READ_BUFFER_SIZE;

/// Decompresses a raw deflate stream (RFC 1951, no zlib/gzip wrapper) on
/// the fly, exposing the decompressed bytes through [`Read`].
///
/// The adapter owns an input buffer refilled from the underlying stream on
/// demand and drives [`flate2::Decompress`] directly: decompressed bytes go
/// straight into the caller's buffer. A read returns `Ok(0)` exactly when
/// inflate reports the logical end of the compressed stream. Malformed
/// input — a bad block header, an invalid code, or the underlying stream
/// ending mid-block — surfaces as [`Error::Decode`] tunneled through the
/// returned `io::Error`, so corruption is distinguishable from a transport
/// failure and from benign end-of-stream. Underlying I/O errors propagate
/// unmasked.
///
/// The stream is forward-only and single-use: it cannot be rewound, only
/// reopened from its source entry.
pub struct InflateReader<R> {
    input: R,
    decomp: Decompress,
    in_buf: Box<[u8]>,
    in_pos: usize,
    in_len: usize,
    input_eof: bool,
    finished: bool,
    name: String,
}

impl<R> std::fmt::Debug for InflateReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflateReader")
            .field("name", &self.name)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<R: Read> InflateReader<R> {
    /// Creates a new inflate stream.
    ///
    /// # Arguments
    ///
    /// * `input` - The compressed data source
    /// * `name` - Entry name used as context in decode errors
    pub fn new(input: R, name: impl Into<String>) -> Self {
        Self {
            input,
            decomp: Decompress::new(false),
            in_buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            in_pos: 0,
            in_len: 0,
            input_eof: false,
            finished: false,
            name: name.into(),
        }
    }

    /// Returns true once the compressed stream has fully decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.decomp.total_out()
    }

    fn decode_err(&self, reason: impl Into<String>) -> io::Error {
        Error::decode(&self.name, reason).into_io()
    }
}

impl<R: Read> Read for InflateReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.finished {
            return Ok(0);
        }

        loop {
            if self.in_pos == self.in_len && !self.input_eof {
                self.in_len = self.input.read(&mut self.in_buf)?;
                self.in_pos = 0;
                if self.in_len == 0 {
                    self.input_eof = true;
                }
            }

            let input = &self.in_buf[self.in_pos..self.in_len];
            let flush = if self.input_eof {
                FlushDecompress::Finish
            } else {
                FlushDecompress::None
            };

            let before_in = self.decomp.total_in();
            let before_out = self.decomp.total_out();
            let status = match self.decomp.decompress(input, buf, flush) {
                Ok(status) => status,
                Err(err) => return Err(self.decode_err(err.to_string())),
            };
            self.in_pos += (self.decomp.total_in() - before_in) as usize;
            let produced = (self.decomp.total_out() - before_out) as usize;

            match status {
                Status::StreamEnd => {
                    self.finished = true;
                    return Ok(produced);
                }
                Status::Ok if produced > 0 => return Ok(produced),
                Status::Ok => continue,
                Status::BufError => {
                    if produced > 0 {
                        return Ok(produced);
                    }
                    if self.input_eof {
                        return Err(self.decode_err("unexpected end of deflate stream"));
                    }
                    // Input and output space are both available; a stall
                    // here means the decoder state is wedged.
                    return Err(self.decode_err("deflate stream made no progress"));
                }
            }
        }
    }
}
