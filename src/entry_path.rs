//! Validated relative paths for archive entries and loose-file destinations.

use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum length for entry paths (in bytes).
///
/// Well above any real file system limit (Linux PATH_MAX is 4KB).
const MAX_PATH_LENGTH: usize = 32768;

/// A normalized relative path inside the output directory.
///
/// `EntryPath` is what both archive entry names and loose-file destinations
/// are reduced to before anything is written. Parsing:
/// - converts `\` separators to `/`
/// - drops empty and `.` segments (so `a//b/` and `./a/b` become `a/b`)
/// - rejects `..` segments, absolute paths, drive prefixes and NUL bytes
///
/// Zip directory entries are stored with a trailing `/`; that slash is
/// dropped, the directory flag lives on the entry itself.
///
/// # Examples
///
/// ```
/// use archpatch::EntryPath;
///
/// let path = EntryPath::parse("META-INF/services/").unwrap();
/// assert_eq!(path.as_str(), "META-INF/services");
/// assert_eq!(path.file_name(), "services");
///
/// assert!(EntryPath::parse("../escape.class").is_none());
/// assert!(EntryPath::parse("/etc/passwd").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryPath(String);

impl EntryPath {
    /// Parses and normalizes an entry name.
    ///
    /// Returns `None` if the name is empty after normalization or could
    /// escape the directory it is resolved against.
    pub fn parse(name: &str) -> Option<Self> {
        if name.contains('\0') || name.len() > MAX_PATH_LENGTH {
            return None;
        }

        let name = name.replace('\\', "/");
        if name.starts_with('/') {
            return None;
        }

        let mut segments = Vec::new();
        for segment in name.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if has_drive_prefix(s) => return None,
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return None;
        }
        Some(Self(segments.join("/")))
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Returns the last segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Resolves this path below `root`, one component per segment.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }
}

/// Checks a segment for a Windows drive prefix such as `C:`.
fn has_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
