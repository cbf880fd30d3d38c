//! Mount configuration.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Pack extensions mounted by default when scanning a search root.
const DEFAULT_PACK_EXTENSIONS: &[&str] = &["pk4", "zip"];

/// Describes which containers a [`FileSystem`](crate::FileSystem) mounts
/// at initialization.
///
/// The configuration holds an ordered list of search roots and an optional
/// list of explicit pack files. For each search root, packs carrying one of
/// the configured extensions are discovered in the root's top level and
/// mounted, then the root itself is mounted as a loose directory (which
/// outranks every pack). Where the roots and packs come from — game
/// detection, user settings — is the caller's concern; the filesystem only
/// consumes the resulting list.
///
/// # Example
///
/// ```rust,no_run
/// use pakfs::{FileSystem, MountConfig};
///
/// let config = MountConfig::new()
///     .search_root("/games/darkmod")
///     .search_root("/home/player/.darkmod/fms/current")
///     .pack_extension("pk4dir");
///
/// let fs = FileSystem::with_config(&config)?;
/// # Ok::<(), pakfs::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MountConfig {
    search_roots: Vec<PathBuf>,
    archives: Vec<PathBuf>,
    pack_extensions: Vec<String>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MountConfig {
    /// Creates a configuration with no roots and the default pack
    /// extensions (`pk4`, `zip`).
    pub fn new() -> Self {
        Self {
            search_roots: Vec::new(),
            archives: Vec::new(),
            pack_extensions: DEFAULT_PACK_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Appends a search root. Roots are mounted in the order given; among
    /// loose directories, earlier roots win.
    pub fn search_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_roots.push(path.into());
        self
    }

    /// Appends an explicit pack file, mounted after all search roots.
    pub fn archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.archives.push(path.into());
        self
    }

    /// Adds a pack extension recognized when scanning search roots.
    /// Matching is case-insensitive.
    pub fn pack_extension(mut self, extension: impl Into<String>) -> Self {
        let ext = extension.into();
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if !self.pack_extensions.contains(&ext) {
            self.pack_extensions.push(ext);
        }
        self
    }

    /// The configured search roots, in mount order.
    pub fn search_roots(&self) -> impl Iterator<Item = &Path> {
        self.search_roots.iter().map(PathBuf::as_path)
    }

    /// The explicitly configured pack files, in mount order.
    pub fn archives(&self) -> impl Iterator<Item = &Path> {
        self.archives.iter().map(PathBuf::as_path)
    }

    /// Finds pack files in the top level of a search root.
    ///
    /// The result is sorted by file name so mount logging is stable; the
    /// filesystem re-sorts containers by precedence on every mount anyway.
    pub(crate) fn scan_packs(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let read_err =
            |e: std::io::Error| Error::mount(root.display().to_string(), e.to_string());

        let mut packs = Vec::new();
        for entry in std::fs::read_dir(root).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| {
                    let e = e.to_ascii_lowercase();
                    self.pack_extensions.contains(&e)
                });
            if matches {
                packs.push(path);
            }
        }
        packs.sort();
        Ok(packs)
    }
}
