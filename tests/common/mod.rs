//! Shared test utilities for integration tests.
//!
//! Pack fixtures are assembled by hand, byte by byte, so the tests exercise
//! the parser against the real wire format without depending on an archiver.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::DeflateEncoder;

const LOCAL_SIG: u32 = 0x0403_4b50;
const CENTRAL_SIG: u32 = 0x0201_4b50;
const END_SIG: u32 = 0x0605_4b50;

/// One entry queued for a [`PackBuilder`].
struct BuiltEntry {
    name: String,
    method: u16,
    crc32: u32,
    payload: Vec<u8>,
    uncompressed_size: u32,
}

/// Assembles ZIP/PK4 pack bytes by hand.
///
/// ```ignore
/// let bytes = PackBuilder::new()
///     .deflated("textures/x.tga", b"pixels")
///     .stored("readme.txt", b"notes")
///     .build();
/// ```
pub struct PackBuilder {
    entries: Vec<BuiltEntry>,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a stored (method 0) entry.
    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(BuiltEntry {
            name: name.to_string(),
            method: 0,
            crc32: crc32fast::hash(data),
            payload: data.to_vec(),
            uncompressed_size: data.len() as u32,
        });
        self
    }

    /// Adds a deflated (method 8) entry, compressing `data`.
    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let payload = encoder.finish().unwrap();

        self.entries.push(BuiltEntry {
            name: name.to_string(),
            method: 8,
            crc32: crc32fast::hash(data),
            payload,
            uncompressed_size: data.len() as u32,
        });
        self
    }

    /// Adds an entry with a raw method id and payload, for testing how
    /// unsupported or corrupt entries are handled.
    pub fn raw(
        mut self,
        name: &str,
        method: u16,
        payload: &[u8],
        uncompressed_size: u32,
        crc32: u32,
    ) -> Self {
        self.entries.push(BuiltEntry {
            name: name.to_string(),
            method,
            crc32,
            payload: payload.to_vec(),
            uncompressed_size,
        });
        self
    }

    /// Serializes the pack: local headers + payloads, central directory,
    /// end record.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut offsets = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            offsets.push(out.len() as u32);
            out.extend_from_slice(&LOCAL_SIG.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes()); // mod time + date
            out.extend_from_slice(&entry.crc32.to_le_bytes());
            out.extend_from_slice(&(entry.payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // extra len
            out.extend_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&entry.payload);
        }

        let dir_offset = out.len() as u32;
        for (entry, offset) in self.entries.iter().zip(&offsets) {
            out.extend_from_slice(&CENTRAL_SIG.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version made by
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes()); // mod time + date
            out.extend_from_slice(&entry.crc32.to_le_bytes());
            out.extend_from_slice(&(entry.payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // extra len
            out.extend_from_slice(&0u16.to_le_bytes()); // comment len
            out.extend_from_slice(&0u16.to_le_bytes()); // disk number start
            out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(entry.name.as_bytes());
        }
        let dir_size = out.len() as u32 - dir_offset;

        out.extend_from_slice(&END_SIG.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // central dir disk
        out.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&dir_size.to_le_bytes());
        out.extend_from_slice(&dir_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment len

        out
    }

    /// Writes the pack into `dir` under `file_name` and returns its path.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Creates a loose file (and its parent directories) under a root.
pub fn touch(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}
