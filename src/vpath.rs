//! Virtual path type with validation and case folding.
//!
//! Virtual paths are forward-slash separated and independent of which
//! container backs them. Lookups are case-insensitive: a `VirtualPath`
//! stores the ASCII-lowercase folding of its input, which is also the key
//! form used by every container index. Entry names as stored in the packs
//! keep their original case for display.

use crate::{Error, Result};
use std::fmt;

/// A validated virtual file path, folded to its case-insensitive lookup key.
///
/// `VirtualPath` normalizes backslashes to forward slashes, strips leading
/// and trailing separators, folds ASCII letters to lowercase, and rejects:
///
/// - empty paths
/// - NUL bytes
/// - empty segments (`a//b`)
/// - `.` and `..` segments
///
/// # Examples
///
/// ```
/// use pakfs::VirtualPath;
///
/// let path = VirtualPath::new("Textures/Base_Wall/Metal.TGA").unwrap();
/// assert_eq!(path.as_str(), "textures/base_wall/metal.tga");
///
/// assert!(VirtualPath::new("../maps/secret.map").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Creates a new `VirtualPath` from a string, validating and folding it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path is empty after
    /// normalization, contains NUL bytes, or contains empty, `.` or `..`
    /// segments.
    pub fn new(s: &str) -> Result<Self> {
        let folded = fold_path(s);
        validate(&folded)?;
        Ok(Self(folded))
    }

    /// Returns the folded lookup key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the parent directory of this path.
    ///
    /// Returns an empty string for a single-segment path (the root).
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Returns the file extension, if any.
    ///
    /// The extension is the portion of the file name after the last `.`;
    /// a name starting with a dot (`.gitignore`) has no extension.
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let dot_pos = file_name.rfind('.')?;
        if dot_pos == 0 {
            None
        } else {
            Some(&file_name[dot_pos + 1..])
        }
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for VirtualPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Normalizes separators without touching case: forward slashes, no
/// leading or trailing separator. Used for display names, which keep the
/// case stored in the container.
pub(crate) fn normalize(s: &str) -> String {
    s.replace('\\', "/").trim_matches('/').to_string()
}

/// Folds a raw path into lookup-key form: [`normalize`]d and folded to
/// ASCII lowercase. Folding is byte-for-byte, so a normalized display name
/// and its folded key always have equal length and aligned segments.
pub(crate) fn fold_path(s: &str) -> String {
    normalize(s).to_ascii_lowercase()
}

/// Folds a directory prefix for enumeration.
///
/// Unlike file paths, an empty result is valid here and denotes the root.
pub(crate) fn fold_dir(s: &str) -> String {
    fold_path(s)
}

fn validate(folded: &str) -> Result<()> {
    if folded.is_empty() {
        return Err(Error::InvalidPath("empty path".into()));
    }
    if folded.contains('\0') {
        return Err(Error::InvalidPath("contains NUL byte".into()));
    }
    for segment in folded.split('/') {
        if segment.is_empty() {
            return Err(Error::InvalidPath(
                "empty segment (consecutive slashes)".into(),
            ));
        }
        if segment == "." || segment == ".." {
            return Err(Error::InvalidPath(format!(
                "'{segment}' segment not allowed"
            )));
        }
    }
    Ok(())
}
