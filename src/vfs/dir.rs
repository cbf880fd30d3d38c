//! Loose directory containers.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::{Error, Result, vpath};

/// A loose file found under a directory root.
#[derive(Debug, Clone)]
pub(crate) struct LooseFile {
    /// Virtual path relative to the root, original case.
    pub name: String,
    /// Concrete path on disk.
    pub path: PathBuf,
    /// File size at mount time.
    pub size: u64,
}

/// A mounted loose directory root.
///
/// The tree is walked once at mount time into an index keyed by folded
/// virtual path, mirroring how pack containers index their directory
/// tables. Loose roots always outrank pack containers in the resolver.
pub struct DirectoryRoot {
    name: String,
    root: PathBuf,
    index: HashMap<String, LooseFile>,
    alive: Arc<AtomicBool>,
}

impl std::fmt::Debug for DirectoryRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryRoot")
            .field("name", &self.name)
            .field("files", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl DirectoryRoot {
    /// Mounts a directory root, walking its tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mount`] if the path is not a readable directory or
    /// the walk fails partway.
    pub fn mount(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let name = root.display().to_string();

        if !root.is_dir() {
            return Err(Error::mount(&name, "not a directory"));
        }

        let mut index = HashMap::new();
        walk(root, "", &mut index).map_err(|e| Error::mount(&name, e.to_string()))?;

        debug!("mounted directory '{name}' ({} files)", index.len());

        Ok(Self {
            name,
            root: root.to_path_buf(),
            index,
            alive: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Name of the container (the root path as given).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root directory on disk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files under the root at mount time.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the root held no files at mount time.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks up a file by folded virtual path.
    pub(crate) fn lookup(&self, folded_path: &str) -> Option<&LooseFile> {
        self.index.get(folded_path)
    }

    /// Iterates over `(folded_path, file)` pairs, in no particular order.
    pub(crate) fn indexed_files(&self) -> impl Iterator<Item = (&str, &LooseFile)> {
        self.index.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Opens the concrete file behind a loose entry.
    pub(crate) fn open_file(&self, file: &LooseFile) -> Result<fs::File> {
        Ok(fs::File::open(&file.path)?)
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

fn walk(dir: &Path, prefix: &str, index: &mut HashMap<String, LooseFile>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let child_name = if prefix.is_empty() {
            file_name
        } else {
            format!("{prefix}/{file_name}")
        };

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&entry.path(), &child_name, index)?;
        } else if file_type.is_file() {
            let size = entry.metadata()?.len();
            index.insert(
                vpath::fold_path(&child_name),
                LooseFile {
                    name: child_name,
                    path: entry.path(),
                    size,
                },
            );
        } else if file_type.is_symlink() {
            // Dangling links are skipped rather than failing the mount.
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {
                    index.insert(
                        vpath::fold_path(&child_name),
                        LooseFile {
                            name: child_name,
                            path: entry.path(),
                            size: meta.len(),
                        },
                    );
                }
                // Linked directories are not followed; cycles are not
                // worth the bookkeeping for game asset trees.
                _ => {}
            }
        }
    }
    Ok(())
}
