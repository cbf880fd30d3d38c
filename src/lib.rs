//! # pakfs
//!
//! A union virtual filesystem over ZIP/PK4 game packs and loose directory
//! roots, in the style of the idTech4 asset filesystem: multiple containers
//! overlay one virtual tree, lookups resolve by deterministic precedence,
//! and archived files stream through inflate transparently.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::io::Read;
//! use pakfs::{FileSystem, MountConfig, Result};
//!
//! fn main() -> Result<()> {
//!     // Mount every pk4 in the game directory, overridden by loose files.
//!     let config = MountConfig::new().search_root("/games/darkmod");
//!     let fs = FileSystem::with_config(&config)?;
//!
//!     // Open a file without caring which container backs it.
//!     if let Some(mut file) = fs.open("materials/tdm_stone.mtr")? {
//!         println!("{} bytes from {}", file.size(), file.source());
//!         let mut text = String::new();
//!         file.read_to_string(&mut text)?;
//!     }
//!
//!     // Enumerate a virtual directory, merged across all containers.
//!     for entry in fs.read_dir("textures/darkmod") {
//!         println!("{} ({})", entry.name(), entry.source());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Precedence
//!
//! Loose directory roots always outrank packs. Packs order by *reverse*
//! case-insensitive name comparison — `zpak.pk4` beats `apak.pk4` — so
//! later-named patch packs override earlier ones, matching the game
//! engine's rule. See [`order`] for the folding details.
//!
//! ## Streams
//!
//! Opening an archived file builds a chain of [`std::io::Read`] adapters: a
//! private handle on the pack file, a [`stream::BoundedReader`] carving the
//! entry's compressed payload, and a [`stream::InflateReader`] decoding it.
//! Handles are forward-only and single-use; each owns its chain, so any
//! number of files can be read concurrently from the same pack.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Lookup misses are `Ok(None)`, not
//! errors; corrupt data is distinguished from transport failures so callers
//! can report it. See [`error`] for the full taxonomy.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod config;
pub mod error;
pub mod order;
pub mod stream;
pub mod vfs;
pub mod vpath;
pub mod zip;

pub use config::MountConfig;
pub use error::{Error, Result};
pub use vpath::VirtualPath;

// Re-export the resolver API at crate root for convenience
pub use vfs::{DirEntry, DirectoryRoot, FileSystem, VfsFile};

// Re-export the pack container API at crate root for convenience
pub use zip::{CompressionMethod, EntryReader, PakArchive, PakEntry};

// Re-export the stream adapters at crate root for convenience
pub use stream::{BoundedReader, InflateReader, TextReader};
