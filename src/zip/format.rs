//! ZIP wire format: signatures, end record, central directory records.
//!
//! Only the pieces needed to index a pack are implemented: locating the
//! end-of-central-directory record, walking the central directory, and
//! resolving an entry's payload offset through its local file header.
//! ZIP64 archives are rejected; game packs do not use them.
//!
//! All functions return [`io::Result`]; malformed structure is reported as
//! [`io::ErrorKind::InvalidData`] with a description, and the mounting
//! container wraps whatever comes out of here into a mount error carrying
//! the pack's name.

use std::io::{self, Read, Seek, SeekFrom};

/// Local file header signature (`PK\x03\x04`).
pub(crate) const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Central directory file header signature (`PK\x01\x02`).
pub(crate) const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;

/// End of central directory signature (`PK\x05\x06`).
pub(crate) const END_RECORD_SIGNATURE: u32 = 0x0605_4b50;

/// Fixed size of the end-of-central-directory record.
const END_RECORD_SIZE: u64 = 22;

/// Maximum trailing comment length, bounding the backward signature scan.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Fixed portion of a central directory file header.
const CENTRAL_HEADER_SIZE: usize = 46;

/// Fixed portion of a local file header.
const LOCAL_HEADER_SIZE: usize = 30;

/// Compression method of a pack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Method 0: payload is the file's bytes, uncompressed.
    Stored,
    /// Method 8: payload is a raw deflate stream (RFC 1951).
    Deflated,
}

impl CompressionMethod {
    /// Maps a raw method id to a supported method, if any.
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::Stored),
            8 => Some(Self::Deflated),
            _ => None,
        }
    }
}

/// Parsed end-of-central-directory record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EndRecord {
    /// Total number of central directory entries.
    pub entry_count: usize,
    /// Byte offset of the central directory within the pack.
    pub dir_offset: u64,
    /// Byte size of the central directory.
    pub dir_size: u64,
}

/// A central directory entry as read off the wire.
#[derive(Debug, Clone)]
pub(crate) struct RawEntry {
    /// Entry name, forward-slash separated, original case.
    pub name: String,
    /// Raw compression method id.
    pub method: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Size of the compressed payload.
    pub compressed_size: u64,
    /// Declared uncompressed size.
    pub uncompressed_size: u64,
    /// Offset of the entry's local file header.
    pub local_header_offset: u64,
}

impl RawEntry {
    /// Directory placeholders carry a trailing slash and no data.
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

fn bad(reason: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, reason.into())
}

fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Locates and parses the end-of-central-directory record.
///
/// The record sits at the very end of the file, preceded only by an
/// optional comment of up to 64 KiB, so the signature is scanned backwards
/// within that window.
pub(crate) fn read_end_record<R: Read + Seek>(reader: &mut R) -> io::Result<EndRecord> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    if file_size < END_RECORD_SIZE {
        return Err(bad("file too small for an end-of-central-directory record"));
    }

    let window = (END_RECORD_SIZE + MAX_COMMENT_SIZE).min(file_size);
    let window_start = file_size - window;
    reader.seek(SeekFrom::Start(window_start))?;
    let mut tail = vec![0u8; window as usize];
    reader.read_exact(&mut tail)?;

    let sig = END_RECORD_SIGNATURE.to_le_bytes();
    let mut pos = tail.len() - END_RECORD_SIZE as usize;
    let record_start = loop {
        if tail[pos..pos + 4] == sig {
            break pos;
        }
        if pos == 0 {
            return Err(bad("end-of-central-directory record not found"));
        }
        pos -= 1;
    };

    let record = &tail[record_start..record_start + END_RECORD_SIZE as usize];
    let disk_number = u16_at(record, 4);
    let dir_disk = u16_at(record, 6);
    let entries_this_disk = u16_at(record, 8);
    let entry_count = u16_at(record, 10);
    let dir_size = u64::from(u32_at(record, 12));
    let dir_offset = u64::from(u32_at(record, 16));

    if disk_number != 0 || dir_disk != 0 || entries_this_disk != entry_count {
        return Err(bad("multi-disk archives are not supported"));
    }
    if entry_count == 0xFFFF || dir_size == 0xFFFF_FFFF || dir_offset == 0xFFFF_FFFF {
        return Err(bad("ZIP64 archives are not supported"));
    }
    if dir_offset + dir_size > window_start + record_start as u64 {
        return Err(bad("central directory extends past its end record"));
    }

    Ok(EndRecord {
        entry_count: usize::from(entry_count),
        dir_offset,
        dir_size,
    })
}

/// Reads and parses all central directory entries.
pub(crate) fn read_central_directory<R: Read + Seek>(
    reader: &mut R,
    end: &EndRecord,
) -> io::Result<Vec<RawEntry>> {
    reader.seek(SeekFrom::Start(end.dir_offset))?;
    let mut dir = vec![0u8; end.dir_size as usize];
    reader.read_exact(&mut dir)?;

    let mut entries = Vec::with_capacity(end.entry_count);
    let mut pos = 0usize;

    for index in 0..end.entry_count {
        if pos + CENTRAL_HEADER_SIZE > dir.len() {
            return Err(bad(format!(
                "central directory truncated at entry {index} of {}",
                end.entry_count
            )));
        }
        let header = &dir[pos..pos + CENTRAL_HEADER_SIZE];
        if u32_at(header, 0) != CENTRAL_HEADER_SIGNATURE {
            return Err(bad(format!("bad central directory signature at entry {index}")));
        }

        let method = u16_at(header, 10);
        let crc32 = u32_at(header, 16);
        let compressed_size = u32_at(header, 20);
        let uncompressed_size = u32_at(header, 24);
        let name_len = usize::from(u16_at(header, 28));
        let extra_len = usize::from(u16_at(header, 30));
        let comment_len = usize::from(u16_at(header, 32));
        let local_header_offset = u32_at(header, 42);

        if compressed_size == 0xFFFF_FFFF
            || uncompressed_size == 0xFFFF_FFFF
            || local_header_offset == 0xFFFF_FFFF
        {
            return Err(bad("ZIP64 archives are not supported"));
        }

        let name_start = pos + CENTRAL_HEADER_SIZE;
        let record_end = name_start + name_len + extra_len + comment_len;
        if record_end > dir.len() {
            return Err(bad(format!("central directory truncated inside entry {index}")));
        }

        let name = String::from_utf8_lossy(&dir[name_start..name_start + name_len]).into_owned();

        entries.push(RawEntry {
            name,
            method,
            crc32,
            compressed_size: u64::from(compressed_size),
            uncompressed_size: u64::from(uncompressed_size),
            local_header_offset: u64::from(local_header_offset),
        });

        pos = record_end;
    }

    Ok(entries)
}

/// Resolves the byte offset of an entry's compressed payload.
///
/// The central directory records where the entry's *local header* starts;
/// the payload follows the header's variable-length name and extra fields,
/// whose lengths are only recorded in the local header itself.
pub(crate) fn resolve_payload_offset<R: Read + Seek>(
    reader: &mut R,
    local_header_offset: u64,
) -> io::Result<u64> {
    reader.seek(SeekFrom::Start(local_header_offset))?;
    let mut header = [0u8; LOCAL_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    if u32_at(&header, 0) != LOCAL_HEADER_SIGNATURE {
        return Err(bad("bad local file header signature"));
    }
    let name_len = u64::from(u16_at(&header, 26));
    let extra_len = u64::from(u16_at(&header, 28));

    Ok(local_header_offset + LOCAL_HEADER_SIZE as u64 + name_len + extra_len)
}
