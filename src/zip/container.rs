//! Mounted pack container and its entry table.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::stream::{BoundedReader, InflateReader};
use crate::zip::format::{self, CompressionMethod};
use crate::{Error, Result, vpath};

/// One file's location inside a pack.
///
/// Created when the pack's central directory is parsed at mount time and
/// immutable thereafter. The entry records where the compressed payload
/// lives (via the local header offset), how large it is in both forms, and
/// the checksum of the original data.
#[derive(Debug, Clone)]
pub struct PakEntry {
    name: String,
    local_header_offset: u64,
    compressed_size: u64,
    size: u64,
    method: u16,
    crc32: u32,
}

impl PakEntry {
    /// Virtual path of the entry, in the case stored in the pack.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared uncompressed size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Size of the compressed payload in bytes.
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// CRC-32 of the uncompressed data, from the pack's directory table.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// The entry's compression method, or `None` for methods this crate
    /// does not support (such entries are listed but cannot be opened).
    pub fn compression(&self) -> Option<CompressionMethod> {
        CompressionMethod::from_raw(self.method)
    }
}

/// A mounted ZIP/PK4 pack.
///
/// Mounting parses the central directory into an index keyed by folded
/// virtual path; the pack's backing file is then reopened privately for
/// every [`open_entry`](Self::open_entry) call, so concurrent handles never
/// share a read cursor.
pub struct PakArchive {
    name: String,
    path: PathBuf,
    index: HashMap<String, PakEntry>,
    alive: Arc<AtomicBool>,
}

impl std::fmt::Debug for PakArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PakArchive")
            .field("name", &self.name)
            .field("entries", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl PakArchive {
    /// Mounts a pack file, parsing its directory table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mount`] if the file cannot be read, the central
    /// directory is malformed or truncated, or any entry's byte range
    /// overflows the file. A failed mount leaves nothing behind.
    pub fn mount(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::mount(path.display().to_string(), "not a file path"))?;

        let mount_err = |e: io::Error| Error::mount(&name, e.to_string());

        let mut file = File::open(path).map_err(mount_err)?;
        let file_size = file.metadata().map_err(mount_err)?.len();

        let end = format::read_end_record(&mut file).map_err(mount_err)?;
        let raw_entries = format::read_central_directory(&mut file, &end).map_err(mount_err)?;

        let mut index = HashMap::with_capacity(raw_entries.len());
        for raw in raw_entries {
            if raw.is_directory() || raw.name.is_empty() {
                continue;
            }
            // The compressed payload must lie inside the container.
            let end_of_data = raw
                .local_header_offset
                .checked_add(raw.compressed_size)
                .filter(|&end| end <= file_size);
            if end_of_data.is_none() {
                return Err(Error::mount(
                    &name,
                    format!("entry '{}' overflows the archive", raw.name),
                ));
            }

            let key = vpath::fold_path(&raw.name);
            let previous = index.insert(
                key,
                PakEntry {
                    name: raw.name,
                    local_header_offset: raw.local_header_offset,
                    compressed_size: raw.compressed_size,
                    size: raw.uncompressed_size,
                    method: raw.method,
                    crc32: raw.crc32,
                },
            );
            if let Some(previous) = previous {
                debug!("{name}: duplicate entry '{}', later record wins", previous.name());
            }
        }

        debug!("mounted pack '{name}' ({} entries)", index.len());

        Ok(Self {
            name,
            path: path.to_path_buf(),
            index,
            alive: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Name of the pack file, used for precedence comparison.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of file entries in the pack.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the pack holds no file entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks up an entry by folded virtual path.
    pub fn entry(&self, folded_path: &str) -> Option<&PakEntry> {
        self.index.get(folded_path)
    }

    /// Iterates over all entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &PakEntry> {
        self.index.values()
    }

    /// Iterates over `(folded_path, entry)` pairs, in no particular order.
    pub(crate) fn indexed_entries(&self) -> impl Iterator<Item = (&str, &PakEntry)> {
        self.index.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Opens an entry for reading, building its stream chain.
    ///
    /// A fresh handle on the backing file is acquired per open; the
    /// returned reader owns it together with the bounded range view and,
    /// for deflated entries, the inflate transform.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedMethod`] for methods other than stored/deflate;
    /// [`Error::Decode`] if the entry's local header is malformed;
    /// [`Error::Io`] if the backing file cannot be read.
    pub fn open_entry(&self, entry: &PakEntry) -> Result<EntryReader> {
        let method = entry.compression().ok_or_else(|| Error::UnsupportedMethod {
            name: entry.name.clone(),
            method: entry.method,
        })?;

        let mut file = File::open(&self.path)?;
        let payload_offset = format::resolve_payload_offset(&mut file, entry.local_header_offset)
            .map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                    Error::decode(&entry.name, e.to_string())
                }
                _ => Error::Io(e),
            })?;

        let bounded = BoundedReader::new(file, payload_offset, entry.compressed_size);
        let reader = match method {
            CompressionMethod::Stored => EntryReader::Stored(bounded),
            CompressionMethod::Deflated => {
                EntryReader::Deflated(InflateReader::new(bounded, entry.name.clone()))
            }
        };
        Ok(reader)
    }

    /// Shared liveness flag handed to stream handles for unmount
    /// invalidation.
    pub(crate) fn liveness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }

    /// Marks the container unmounted; open handles fail their next read.
    pub(crate) fn invalidate(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Stream chain over one pack entry's payload.
#[derive(Debug)]
pub enum EntryReader {
    /// Stored entry: the bounded range is the file's bytes.
    Stored(BoundedReader<File>),
    /// Deflated entry: the bounded range feeds the inflate transform.
    Deflated(InflateReader<BoundedReader<File>>),
}

impl Read for EntryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stored(inner) => inner.read(buf),
            Self::Deflated(inner) => inner.read(buf),
        }
    }
}
