//! Error types for archive patching.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of a patch run, along with a convenient [`Result<T>`] type
//! alias.
//!
//! Every variant is fatal: a patch either runs to completion or stops at the
//! first failure. There is no partial-success reporting and no automatic
//! retry, apart from the explicit [`RetryPolicy`] used when cleaning stale
//! output.
//!
//! # Example
//!
//! ```rust,no_run
//! use archpatch::{Error, PatchSpec, patch};
//!
//! let spec = PatchSpec::new("compiler.jar", "build/patched");
//! match patch(&spec) {
//!     Ok(result) => println!("{} entries written", result.entries_written()),
//!     Err(Error::InvalidArchive { path, reason }) => {
//!         eprintln!("{} is not a readable zip: {}", path.display(), reason);
//!     }
//!     Err(e) => eprintln!("patch failed: {}", e),
//! }
//! ```
//!
//! [`RetryPolicy`]: crate::clean::RetryPolicy

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FileOperation {
    /// Opening a file for reading.
    Open,
    /// Reading file or entry data.
    Read,
    /// Creating a file or directory.
    Create,
    /// Writing file data.
    Write,
    /// Removing a file, directory or symlink.
    Remove,
    /// Inspecting file metadata.
    Metadata,
    /// Listing a directory.
    ReadDir,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Read => write!(f, "read"),
            Self::Create => write!(f, "create"),
            Self::Write => write!(f, "write"),
            Self::Remove => write!(f, "remove"),
            Self::Metadata => write!(f, "stat"),
            Self::ReadDir => write!(f, "list"),
        }
    }
}

/// Helper struct for formatting DeleteFailed error messages.
struct DeleteFailedDisplay<'a> {
    path: &'a Path,
    failed: &'a [PathBuf],
    remaining: &'a [PathBuf],
}

impl fmt::Display for DeleteFailedDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unable to recursively delete directory {}, failed paths:",
            self.path.display()
        )?;
        for path in self.failed {
            write!(f, "\n\t- {}", path.display())?;
        }
        write!(f, "\nRemaining files:")?;
        for path in self.remaining {
            write!(f, "\n\t- {}", path.display())?;
        }
        Ok(())
    }
}

/// The main error type for patch operations.
///
/// | Category | Variants |
/// |----------|----------|
/// | I/O | [`File`][Self::File], [`DeleteFailed`][Self::DeleteFailed] |
/// | Archive | [`InvalidArchive`][Self::InvalidArchive], [`UnsafeEntryPath`][Self::UnsafeEntryPath] |
/// | Configuration | [`InvalidPattern`][Self::InvalidPattern], [`ArchiveSelection`][Self::ArchiveSelection], [`InvalidConfig`][Self::InvalidConfig] |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A filesystem operation on a known path failed.
    ///
    /// Common causes are a missing source file, a full disk, or missing
    /// permissions on the output directory.
    #[error("Failed to {operation} '{}': {source}", path.display())]
    File {
        /// The operation that was attempted.
        operation: FileOperation,
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A file could not be read as a ZIP archive.
    #[error("Invalid archive '{}': {reason}", path.display())]
    InvalidArchive {
        /// Path of the archive.
        path: PathBuf,
        /// What the zip reader reported.
        reason: String,
    },

    /// An archive entry name would resolve outside the output directory.
    ///
    /// Entry names must be relative and must not contain `..` or drive (`C:`) segments.
    #[error("Unsafe entry path '{entry}' in archive '{}'", archive.display())]
    UnsafeEntryPath {
        /// The archive containing the entry, or the loose file source.
        archive: PathBuf,
        /// The rejected entry name.
        entry: String,
    },

    /// A glob pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Selecting a single archive by file name prefix did not yield exactly one file.
    #[error(
        "Expected exactly one archive starting with '{prefix}', found {}",
        matches.len()
    )]
    ArchiveSelection {
        /// The file name prefix.
        prefix: String,
        /// Every candidate that matched.
        matches: Vec<PathBuf>,
    },

    /// Recursive deletion left files behind.
    ///
    /// `failed` lists every path whose removal failed and `remaining` every
    /// path still present under the target afterwards.
    #[error("{}", DeleteFailedDisplay { path: path.as_path(), failed: failed.as_slice(), remaining: remaining.as_slice() })]
    DeleteFailed {
        /// The deletion target.
        path: PathBuf,
        /// Paths whose removal failed.
        failed: Vec<PathBuf>,
        /// Paths still present under the target.
        remaining: Vec<PathBuf>,
    },

    /// The patch configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates a [`Error::File`] for an operation on a path.
    pub fn file(operation: FileOperation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Converts a zip reader error for the archive at `path`.
    ///
    /// Underlying I/O failures keep their [`io::Error`]; format problems
    /// become [`Error::InvalidArchive`].
    pub(crate) fn from_zip(path: &Path, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(source) => Self::file(FileOperation::Read, path, source),
            other => Self::InvalidArchive {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }

    /// Returns the path this error is about, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. }
            | Self::InvalidArchive { path, .. }
            | Self::DeleteFailed { path, .. } => Some(path),
            Self::UnsafeEntryPath { archive, .. } => Some(archive),
            _ => None,
        }
    }

    /// Returns the underlying I/O error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::File { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// A specialized Result type for patch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait attaching path context to [`io::Result`]s.
pub(crate) trait IoResultExt<T> {
    /// Maps the error into [`Error::File`].
    fn with_path(self, operation: FileOperation, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path(self, operation: FileOperation, path: &Path) -> Result<T> {
        self.map_err(|source| Error::file(operation, path, source))
    }
}
