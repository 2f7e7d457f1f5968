//! Removing stale output.
//!
//! [`delete_recursively`] removes a file, a directory tree or a symlink.
//! Symlinks are always removed as links and never traversed, so a
//! symlinked output directory never takes its target down with it. When a
//! tree cannot be removed completely, the error lists every path that failed
//! and every path still present.
//!
//! [`delete_with_retry`] and [`clean`] wrap deletion in a [`RetryPolicy`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use archpatch::clean::{RetryPolicy, clean};
//!
//! let policy = RetryPolicy::new().attempts(3).backoff(Duration::from_millis(250));
//! clean(["build/patched-classes", "build/tmp"], &policy)?;
//! # Ok::<(), archpatch::Error>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use walkdir::WalkDir;

use crate::error::{FileOperation, IoResultExt};
use crate::{Error, Result};

/// Default number of deletion attempts (the first try plus one retry).
pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Default delay between deletion attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

/// How often, and how patiently, to retry a failed deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Creates the default policy: one retry after 100 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Sets the total number of attempts. Values below 1 are treated as 1.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Sets the fixed delay between attempts.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the total number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the delay between attempts.
    pub fn delay(&self) -> Duration {
        self.backoff
    }
}

/// Deletes a file, symlink or directory tree.
///
/// A missing path is not an error. A symlink is unlinked without touching
/// its target, whether it points to a file or a directory.
///
/// # Errors
///
/// - [`Error::File`] if a single file or symlink cannot be removed
/// - [`Error::DeleteFailed`] if a directory tree is only partly removed
pub fn delete_recursively(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::file(FileOperation::Metadata, path, e)),
    };

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        log::trace!("Removing symlink {}", path.display());
        remove_symlink(path).with_path(FileOperation::Remove, path)
    } else if file_type.is_dir() {
        delete_tree(path)
    } else {
        fs::remove_file(path).with_path(FileOperation::Remove, path)
    }
}

fn delete_tree(root: &Path) -> Result<()> {
    let mut failed = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                failed.push(e.path().unwrap_or(root).to_path_buf());
                continue;
            }
        };

        let file_type = entry.file_type();
        let removed = if file_type.is_symlink() {
            remove_symlink(entry.path())
        } else if file_type.is_dir() {
            fs::remove_dir(entry.path())
        } else {
            fs::remove_file(entry.path())
        };

        if let Err(e) = removed {
            log::debug!("Failed to remove {}: {}", entry.path().display(), e);
            failed.push(entry.path().to_path_buf());
        }
    }

    if failed.is_empty() {
        return Ok(());
    }

    let remaining: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .collect();

    Err(Error::DeleteFailed {
        path: root.to_path_buf(),
        failed,
        remaining,
    })
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    // Directory symlinks and junctions are removed with remove_dir on Windows.
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

#[cfg(not(windows))]
fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// Deletes `path`, retrying according to `policy`.
///
/// Each failed attempt except the last is logged as a warning before the
/// policy's delay. The error of the last attempt is returned unchanged.
pub fn delete_with_retry(path: &Path, policy: &RetryPolicy) -> Result<()> {
    let mut attempt = 1;
    loop {
        log::debug!("Deleting {} (attempt {})", path.display(), attempt);
        match delete_recursively(path) {
            Ok(()) => return Ok(()),
            Err(e) if attempt >= policy.max_attempts() => return Err(e),
            Err(e) => {
                log::warn!(
                    "Unable to delete {} on attempt {}: {}",
                    path.display(),
                    attempt,
                    e
                );
                thread::sleep(policy.delay());
                attempt += 1;
            }
        }
    }
}

/// Deletes every target in order, stopping at the first failure.
///
/// Returns the number of targets processed.
pub fn clean<I, P>(targets: I, policy: &RetryPolicy) -> Result<usize>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut count = 0;
    for target in targets {
        delete_with_retry(target.as_ref(), policy)?;
        count += 1;
    }
    Ok(count)
}

/// Deletes `path` if present and creates it again as an empty directory.
///
/// No retry is attempted.
pub fn recreate_dir(path: &Path) -> Result<()> {
    delete_recursively(path)?;
    fs::create_dir_all(path).with_path(FileOperation::Create, path)
}
