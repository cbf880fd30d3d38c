//! ZIP/PK4 pack containers.
//!
//! A pack is a standard ZIP archive; the game convention merely renames the
//! extension (`.pk4`). The index of a pack is its central directory, parsed
//! once at mount time by [`format`]; [`PakArchive`] holds the resulting
//! entry table and builds the per-open stream chain that carves an entry's
//! compressed payload out of the backing file and inflates it on the fly.

pub mod container;
pub mod format;

pub use container::{EntryReader, PakArchive, PakEntry};
pub use format::CompressionMethod;
