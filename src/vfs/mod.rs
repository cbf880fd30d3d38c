//! Union filesystem resolver.
//!
//! The resolver owns an ordered list of mounted containers — loose
//! directory roots first, then pack archives sorted by the precedence
//! comparator in [`crate::order`] — and resolves every lookup against that
//! list: the first container providing a path wins. Enumeration merges all
//! containers' listings into one de-duplicated view in which the winning
//! container supplies each entry's metadata.
//!
//! The mount table is built once at session start and treated as
//! read-mostly; [`FileSystem`] takes `&mut self` only for mount and
//! unmount, which callers must serialize against concurrent lookups
//! themselves. Open handles never borrow the resolver.
//!
//! # Example
//!
//! ```rust,no_run
//! use pakfs::{FileSystem, MountConfig};
//!
//! fn main() -> pakfs::Result<()> {
//!     let config = MountConfig::new().search_root("/games/darkmod");
//!     let fs = FileSystem::with_config(&config)?;
//!
//!     if let Some(file) = fs.open("textures/darkmod/stone/brick.tga")? {
//!         println!("{} from {}", file.name(), file.source());
//!     }
//!     Ok(())
//! }
//! ```

pub mod dir;
pub mod file;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use crate::config::MountConfig;
use crate::stream::TextReader;
use crate::vpath::{self, VirtualPath};
use crate::zip::PakArchive;
use crate::{Error, READ_BUFFER_SIZE, Result, order};

pub use dir::DirectoryRoot;
pub use file::VfsFile;

/// A mounted container.
enum Mount {
    Pack(PakArchive),
    Dir(DirectoryRoot),
}

impl Mount {
    fn name(&self) -> &str {
        match self {
            Self::Pack(pak) => pak.name(),
            Self::Dir(root) => root.name(),
        }
    }

    fn is_directory(&self) -> bool {
        matches!(self, Self::Dir(_))
    }

    fn contains(&self, folded_path: &str) -> bool {
        match self {
            Self::Pack(pak) => pak.entry(folded_path).is_some(),
            Self::Dir(root) => root.lookup(folded_path).is_some(),
        }
    }

    fn invalidate(&self) {
        match self {
            Self::Pack(pak) => pak.invalidate(),
            Self::Dir(root) => root.invalidate(),
        }
    }
}

/// One name in a merged directory listing.
///
/// When several containers provide the same name, the metadata comes from
/// the highest-precedence one; the name still appears exactly once.
#[derive(Debug, Clone)]
pub struct DirEntry {
    name: String,
    size: u64,
    is_dir: bool,
    source: String,
}

impl DirEntry {
    /// Child name (not the full path), in the winning container's case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uncompressed size of the file; 0 for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns true if this name denotes a subdirectory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns true if this name denotes a file.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Name of the container whose metadata is reported.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// The union filesystem over mounted packs and loose directory roots.
pub struct FileSystem {
    /// Containers in precedence order: directory roots first (in mount
    /// order), then packs in descending comparator order.
    mounts: Vec<Mount>,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("mounts", &self.mount_names().collect::<Vec<_>>())
            .finish()
    }
}

impl FileSystem {
    /// Creates an empty filesystem with no mounted containers.
    pub fn new() -> Self {
        Self { mounts: Vec::new() }
    }

    /// Builds a filesystem from a mount configuration.
    ///
    /// Each search root is scanned for pack files with the configured
    /// extensions; the packs are mounted, then the root itself is mounted
    /// as the overriding loose directory. Explicitly listed archives are
    /// mounted last. Errors abort initialization; callers that prefer to
    /// skip broken packs can mount one container at a time instead.
    pub fn with_config(config: &MountConfig) -> Result<Self> {
        let mut fs = Self::new();
        for root in config.search_roots() {
            for pack in config.scan_packs(root)? {
                fs.mount_archive(&pack)?;
            }
            fs.mount_directory(root)?;
        }
        for pack in config.archives() {
            fs.mount_archive(pack)?;
        }
        Ok(fs)
    }

    /// Mounts a pack file.
    ///
    /// # Errors
    ///
    /// [`Error::Mount`] if the pack is unreadable or malformed, or if its
    /// name compares equal (case-insensitively, under the pack comparator)
    /// to an already-mounted container.
    pub fn mount_archive(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let pak = PakArchive::mount(path)?;
        self.check_name(pak.name())?;
        info!("mounted pack '{}' ({} entries)", pak.name(), pak.len());
        self.mounts.push(Mount::Pack(pak));
        self.resort();
        Ok(())
    }

    /// Mounts a loose directory root. Directory roots outrank all packs.
    ///
    /// # Errors
    ///
    /// [`Error::Mount`] under the same conditions as
    /// [`mount_archive`](Self::mount_archive).
    pub fn mount_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let root = DirectoryRoot::mount(path)?;
        self.check_name(root.name())?;
        info!("mounted directory '{}' ({} files)", root.name(), root.len());
        self.mounts.push(Mount::Dir(root));
        self.resort();
        Ok(())
    }

    /// Unmounts the container with the given name.
    ///
    /// Open handles sourced from the container are invalidated: their next
    /// read fails with [`Error::Unmounted`]. Returns false if no mounted
    /// container matches.
    pub fn unmount(&mut self, name: &str) -> bool {
        let Some(pos) = self
            .mounts
            .iter()
            .position(|m| order::same_name(m.name(), name))
        else {
            return false;
        };
        let mount = self.mounts.remove(pos);
        mount.invalidate();
        info!("unmounted '{}'", mount.name());
        true
    }

    /// Container names in precedence order, highest first.
    pub fn mount_names(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(Mount::name)
    }

    /// Number of mounted containers.
    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }

    /// Opens a virtual file for reading.
    ///
    /// Containers are consulted in precedence order; the first hit wins and
    /// its stream chain is built. Returns `Ok(None)` when no container
    /// provides the path — a miss is normal control flow, not an error. A
    /// decode or I/O failure from the winning container is returned as-is;
    /// the resolver never falls back to a lower-precedence source.
    pub fn open(&self, path: &str) -> Result<Option<VfsFile>> {
        let lookup = VirtualPath::new(path)?;
        let key = lookup.as_str();

        for mount in &self.mounts {
            match mount {
                Mount::Dir(root) => {
                    if let Some(loose) = root.lookup(key) {
                        debug!("'{key}' resolved by directory '{}'", root.name());
                        let file = root.open_file(loose)?;
                        return Ok(Some(VfsFile::new(
                            loose.name.clone(),
                            root.name().to_string(),
                            loose.size,
                            None,
                            root.liveness(),
                            Box::new(file),
                        )));
                    }
                }
                Mount::Pack(pak) => {
                    if let Some(entry) = pak.entry(key) {
                        debug!("'{key}' resolved by pack '{}'", pak.name());
                        let reader = pak.open_entry(entry)?;
                        return Ok(Some(VfsFile::new(
                            vpath::normalize(entry.name()),
                            pak.name().to_string(),
                            entry.size(),
                            Some(entry.crc32()),
                            pak.liveness(),
                            Box::new(reader),
                        )));
                    }
                }
            }
        }

        debug!("'{key}' not found in {} containers", self.mounts.len());
        Ok(None)
    }

    /// Opens a virtual file for line-oriented reading.
    pub fn open_text(&self, path: &str) -> Result<Option<TextReader<VfsFile>>> {
        Ok(self.open(path)?.map(TextReader::new))
    }

    /// Reads a virtual file's full contents.
    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.open(path)? {
            Some(file) => Ok(Some(file.read_to_vec()?)),
            None => Ok(None),
        }
    }

    /// Returns true if any mounted container provides the path.
    pub fn contains(&self, path: &str) -> bool {
        self.containing_container(path).is_some()
    }

    /// Name of the container that would resolve the path, if any.
    pub fn containing_container(&self, path: &str) -> Option<&str> {
        let lookup = VirtualPath::new(path).ok()?;
        self.mounts
            .iter()
            .find(|m| m.contains(lookup.as_str()))
            .map(Mount::name)
    }

    /// Number of containers providing the path.
    pub fn file_count(&self, path: &str) -> usize {
        let Ok(lookup) = VirtualPath::new(path) else {
            return 0;
        };
        self.mounts
            .iter()
            .filter(|m| m.contains(lookup.as_str()))
            .count()
    }

    /// Lists the immediate children of a virtual directory, merged across
    /// all containers.
    ///
    /// Names are de-duplicated case-insensitively; when several containers
    /// provide the same name, the highest-precedence container's entry
    /// supplies the reported metadata. An empty string or `/` lists the
    /// root. An unknown directory yields an empty listing.
    pub fn read_dir(&self, directory: &str) -> Vec<DirEntry> {
        let prefix = dir_prefix(directory);

        let mut merged: HashMap<String, DirEntry> = HashMap::new();
        for mount in &self.mounts {
            collect_children(mount, &prefix, &mut merged);
        }

        let mut entries: Vec<(String, DirEntry)> = merged.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, e)| e).collect()
    }

    /// Visits every file under a virtual directory, merged and
    /// de-duplicated across all containers.
    ///
    /// `depth` bounds how many path segments below `directory` a file may
    /// sit: 1 visits only direct children, 2 also visits files one
    /// subdirectory down, and so on (`usize::MAX` for no limit). The
    /// visitor receives each file's path relative to `directory`, in the
    /// winning container's case, in deterministic (folded lexicographic)
    /// order.
    pub fn for_each_file<F: FnMut(&str)>(&self, directory: &str, depth: usize, mut visitor: F) {
        let prefix = dir_prefix(directory);

        let mut seen: BTreeMap<String, String> = BTreeMap::new();
        for mount in &self.mounts {
            let mut add = |folded: &str, display: &str| {
                let Some(rest) = folded.strip_prefix(prefix.as_str()) else {
                    return;
                };
                if rest.is_empty() || rest.split('/').count() > depth {
                    return;
                }
                let display_rest = &display[display.len() - rest.len()..];
                seen.entry(rest.to_string())
                    .or_insert_with(|| display_rest.to_string());
            };
            match mount {
                Mount::Pack(pak) => {
                    for (folded, entry) in pak.indexed_entries() {
                        add(folded, &vpath::normalize(entry.name()));
                    }
                }
                Mount::Dir(root) => {
                    for (folded, loose) in root.indexed_files() {
                        add(folded, &loose.name);
                    }
                }
            }
        }

        for display in seen.values() {
            visitor(display);
        }
    }

    /// Collects the files under a virtual directory whose extension
    /// matches, relative to `directory`. `"*"` matches every file.
    pub fn files_with_extension(
        &self,
        directory: &str,
        extension: &str,
        depth: usize,
    ) -> Vec<String> {
        let wanted = extension.trim_start_matches('.');
        let mut out = Vec::new();
        self.for_each_file(directory, depth, |name| {
            if wanted == "*" || extension_of(name).is_some_and(|e| e.eq_ignore_ascii_case(wanted)) {
                out.push(name.to_string());
            }
        });
        out
    }

    /// Reads a file fully and checks it against its recorded checksum.
    ///
    /// Returns the number of bytes read, or `Ok(None)` if no container
    /// provides the path. Pack entries are checked against the CRC-32 and
    /// size from the pack's directory table; loose files have no recorded
    /// checksum and verify trivially.
    ///
    /// # Errors
    ///
    /// [`Error::CrcMismatch`] or [`Error::Decode`] when the data does not
    /// match the directory table, plus any decode/I/O error from reading.
    pub fn verify(&self, path: &str) -> Result<Option<u64>> {
        let Some(mut file) = self.open(path)? else {
            return Ok(None);
        };
        let declared = file.size();
        let stored = file.stored_crc32();
        let name = file.name().to_string();

        let mut hasher = crc32fast::Hasher::new();
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = file.read(&mut buf).map_err(Error::from_io)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            total += n as u64;
        }

        if let Some(expected) = stored {
            if total != declared {
                return Err(Error::decode(
                    &name,
                    format!("decoded {total} bytes, expected {declared}"),
                ));
            }
            let actual = hasher.finalize();
            if actual != expected {
                return Err(Error::CrcMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }

        Ok(Some(total))
    }

    /// Rejects a new container whose name is indistinguishable from an
    /// existing mount under the pack comparator.
    fn check_name(&self, name: &str) -> Result<()> {
        if let Some(existing) = self
            .mounts
            .iter()
            .find(|m| order::same_name(m.name(), name))
        {
            return Err(Error::mount(
                name,
                format!("name collides with mounted container '{}'", existing.name()),
            ));
        }
        Ok(())
    }

    /// Restores precedence order after a mount change.
    fn resort(&mut self) {
        // Stable sort: directory roots keep their mount order.
        self.mounts
            .sort_by(|a, b| match (a.is_directory(), b.is_directory()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => order::compare(a.name(), b.name()),
            });
    }
}

/// Folds a directory argument into a child-key prefix.
fn dir_prefix(directory: &str) -> String {
    let folded = vpath::fold_dir(directory);
    if folded.is_empty() {
        String::new()
    } else {
        format!("{folded}/")
    }
}

/// Extension of the last path segment, if any.
fn extension_of(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&base[idx + 1..]),
    }
}

/// Adds a mount's immediate children under `prefix` to the merged listing,
/// keyed by folded child name; existing keys win (the mount list is walked
/// in precedence order).
fn collect_children(mount: &Mount, prefix: &str, merged: &mut HashMap<String, DirEntry>) {
    let source = mount.name();
    let mut add = |folded: &str, display: &str, size: u64| {
        let Some(rest) = folded.strip_prefix(prefix) else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let display_rest = &display[display.len() - rest.len()..];
        let (key, entry) = match rest.find('/') {
            None => (
                rest,
                DirEntry {
                    name: display_rest.to_string(),
                    size,
                    is_dir: false,
                    source: source.to_string(),
                },
            ),
            Some(idx) => (
                &rest[..idx],
                DirEntry {
                    name: display_rest[..idx].to_string(),
                    size: 0,
                    is_dir: true,
                    source: source.to_string(),
                },
            ),
        };
        merged.entry(key.to_string()).or_insert(entry);
    };

    match mount {
        Mount::Pack(pak) => {
            for (folded, entry) in pak.indexed_entries() {
                add(folded, &vpath::normalize(entry.name()), entry.size());
            }
        }
        Mount::Dir(root) => {
            for (folded, loose) in root.indexed_files() {
                add(folded, &loose.name, loose.size);
            }
        }
    }
}
