//! Error types for virtual filesystem operations.
//!
//! This module provides the [`Error`] enum covering the failure modes of
//! mounting and reading pack files, along with a convenient [`Result<T>`]
//! type alias.
//!
//! A lookup miss is *not* an error: resolver operations such as
//! [`FileSystem::open`](crate::FileSystem::open) return `Ok(None)` when no
//! mounted container provides the requested path. Everything else — an
//! unreadable pack at mount time, a corrupt deflate stream, a read on a
//! handle whose source was unmounted — surfaces as an [`Error`] variant
//! carrying enough context (virtual path, container name) to log
//! meaningfully.
//!
//! # Crossing the `io::Read` boundary
//!
//! Open file handles implement [`std::io::Read`], whose error type is
//! [`std::io::Error`]. Crate errors raised mid-read (decode failures,
//! unmounted sources) travel through that boundary as the inner payload of
//! an `io::Error` and can be recovered with [`Error::from_io`]:
//!
//! ```rust,no_run
//! use std::io::Read;
//! use pakfs::{Error, FileSystem};
//!
//! fn read_all(fs: &FileSystem, path: &str) -> pakfs::Result<Option<Vec<u8>>> {
//!     let Some(mut file) = fs.open(path)? else {
//!         return Ok(None);
//!     };
//!     let mut data = Vec::new();
//!     file.read_to_end(&mut data).map_err(Error::from_io)?;
//!     Ok(Some(data))
//! }
//! ```

use std::io;

/// The main error type for pack filesystem operations.
///
/// Each variant includes the context needed to diagnose the issue: the
/// virtual path involved, the container name, or both.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading a backing file.
    ///
    /// This wraps [`std::io::Error`] and is returned when operations on a
    /// container's backing file or a loose file fail. It is never used for
    /// decode failures, which are reported as [`Decode`][Self::Decode] so
    /// that corruption is distinguishable from transport errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A container could not be mounted.
    ///
    /// Raised when a pack's central directory is malformed or truncated,
    /// when an entry's byte range overflows the container, when the backing
    /// file is unreadable, or when the container's name collides with an
    /// existing mount. The failure is fatal to this container only; already
    /// mounted containers are unaffected.
    #[error("cannot mount '{archive}': {reason}")]
    Mount {
        /// Name of the container that failed to mount.
        archive: String,
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// The compressed data of an entry is malformed.
    ///
    /// Distinct from both clean end-of-stream and [`Io`][Self::Io]: callers
    /// can report corruption instead of silently truncating. The entry is
    /// treated as unreadable; the resolver never falls back to a
    /// lower-precedence container on this error.
    #[error("corrupt data in '{name}': {reason}")]
    Decode {
        /// Virtual path of the unreadable entry.
        name: String,
        /// Description of the malformation.
        reason: String,
    },

    /// A read was attempted on a handle whose source container was
    /// unmounted.
    #[error("source container '{container}' was unmounted")]
    Unmounted {
        /// Name of the container the handle was opened from.
        container: String,
    },

    /// A virtual path failed validation.
    #[error("invalid virtual path: {0}")]
    InvalidPath(String),

    /// An entry uses a compression method other than stored or deflate.
    ///
    /// Such entries remain visible in listings but cannot be opened.
    #[error("entry '{name}' uses unsupported compression method {method}")]
    UnsupportedMethod {
        /// Virtual path of the entry.
        name: String,
        /// Raw method id from the pack's directory table.
        method: u16,
    },

    /// An entry's data did not match its stored CRC-32 checksum.
    #[error("CRC mismatch for '{name}': expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        /// Virtual path of the entry.
        name: String,
        /// Checksum recorded in the pack's directory table.
        expected: u32,
        /// Checksum computed over the decompressed data.
        actual: u32,
    },
}

/// A specialized `Result` type for pack filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a mount error for the named container.
    pub(crate) fn mount(archive: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Mount {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    /// Creates a decode error for the named entry.
    pub(crate) fn decode(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Recovers a crate error that crossed the [`io::Read`] boundary.
    ///
    /// Stream handles tunnel crate errors through [`io::Error`] as the
    /// inner payload. This unwraps such payloads back into [`Error`];
    /// genuine I/O errors become [`Error::Io`].
    pub fn from_io(err: io::Error) -> Self {
        match err.downcast::<Self>() {
            Ok(inner) => inner,
            Err(err) => Self::Io(err),
        }
    }

    /// Wraps this error for propagation through an [`io::Read`] impl.
    ///
    /// [`Error::Io`] passes its inner error through untouched so transport
    /// failures are never double-wrapped. Decode errors keep the
    /// `InvalidData` kind; everything else maps to `Other`.
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            Self::Io(err) => err,
            err @ Self::Decode { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
            err => io::Error::other(err),
        }
    }

    /// Returns true if this error indicates corrupt pack data.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::CrcMismatch { .. })
    }
}
