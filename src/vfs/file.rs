//! Open file handles.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Error, Result};

/// An open virtual file.
///
/// The handle owns its stream chain exclusively: for pack entries that is a
/// private descriptor on the pack's backing file, the bounded payload view,
/// and (for deflated entries) the inflate transform; for loose files it is
/// the file itself. Nothing is shared between handles, so two files from
/// the same pack can be read concurrently.
///
/// The handle also holds its source container's liveness flag. Once the
/// container is unmounted, every subsequent read fails with
/// [`Error::Unmounted`] (tunneled through the returned `io::Error`; recover
/// it with [`Error::from_io`]).
pub struct VfsFile {
    name: String,
    source: String,
    size: u64,
    crc32: Option<u32>,
    alive: Arc<AtomicBool>,
    inner: Box<dyn Read + Send>,
}

impl std::fmt::Debug for VfsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VfsFile")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl VfsFile {
    pub(crate) fn new(
        name: String,
        source: String,
        size: u64,
        crc32: Option<u32>,
        alive: Arc<AtomicBool>,
        inner: Box<dyn Read + Send>,
    ) -> Self {
        Self {
            name,
            source,
            size,
            crc32,
            alive,
            inner,
        }
    }

    /// Virtual path of the file, in the case stored in its container.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the container that resolved the lookup.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared uncompressed size in bytes.
    ///
    /// For pack entries this is the size recorded in the directory table;
    /// for loose files, the size observed at mount time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// CRC-32 recorded for the entry, if backed by a pack.
    ///
    /// Loose files carry no stored checksum.
    pub fn stored_crc32(&self) -> Option<u32> {
        self.crc32
    }

    /// Reads the remaining contents into a vector.
    pub fn read_to_vec(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(usize::try_from(self.size).unwrap_or(0));
        self.read_to_end(&mut out).map_err(Error::from_io)?;
        Ok(out)
    }
}

impl Read for VfsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.alive.load(Ordering::Acquire) {
            return Err(Error::Unmounted {
                container: self.source.clone(),
            }
            .into_io());
        }
        self.inner.read(buf)
    }
}
