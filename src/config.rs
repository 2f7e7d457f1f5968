//! Patch configuration.
//!
//! A [`PatchSpec`] names everything one patch run needs: the base archive and
//! its excludes, the secondary archives and the per-prefix include rules
//! applied to them, loose files layered on top, and the output directory.
//!
//! # Example
//!
//! ```rust
//! use archpatch::{LooseFile, PatchSpec};
//!
//! let spec = PatchSpec::new("libs/compiler-1.3.jar", "build/patched-classes")
//!     .exclude("META-INF/services/javax.annotation.processing.Processor")
//!     .exclude("META-INF/native/**/*jansi.*")
//!     .secondary_archive("libs/jansi-1.18.jar")
//!     .include_from(
//!         "jansi-",
//!         ["META-INF/native/**", "org/fusesource/jansi/internal/CLibrary*.class"],
//!     )
//!     .loose_file(LooseFile::file("build/manifest.properties", "manifest.properties"));
//!
//! assert_eq!(spec.excludes().len(), 2);
//! assert_eq!(spec.secondary_rules()[0].prefix(), "jansi-");
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{FileOperation, IoResultExt};
use crate::pattern::PatternSet;
use crate::{EntryPath, Error, Result};

/// Include rule for secondary archives whose file name starts with a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryRule {
    prefix: String,
    includes: Vec<String>,
}

impl SecondaryRule {
    /// Creates a rule.
    pub fn new<I, S>(prefix: impl Into<String>, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            includes: includes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the archive file name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the include patterns.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Returns the candidates this rule selects, in candidate order.
    pub fn select<'a>(&self, candidates: &'a [PathBuf]) -> Vec<&'a Path> {
        candidates
            .iter()
            .filter(|path| file_name_starts_with(path, &self.prefix))
            .map(PathBuf::as_path)
            .collect()
    }
}

/// A file added to the output verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LooseFile {
    /// One file copied to a destination relative to the output directory.
    File {
        /// Source file on disk.
        source: PathBuf,
        /// Destination relative to the output directory.
        dest: String,
    },
    /// Every regular file below `root` matching `includes`, at its path
    /// relative to `root`. An empty include list takes all files.
    Tree {
        /// Root directory of the tree.
        root: PathBuf,
        /// Include patterns, relative to `root`.
        includes: Vec<String>,
    },
}

impl LooseFile {
    /// Creates a single-file source.
    pub fn file(source: impl Into<PathBuf>, dest: impl Into<String>) -> Self {
        Self::File {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Creates a tree source including every file below `root`.
    pub fn tree(root: impl Into<PathBuf>) -> Self {
        Self::Tree {
            root: root.into(),
            includes: Vec::new(),
        }
    }

    /// Creates a tree source restricted to files matching `includes`.
    pub fn tree_matching<I, S>(root: impl Into<PathBuf>, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tree {
            root: root.into(),
            includes: includes.into_iter().map(Into::into).collect(),
        }
    }

    /// Expands this source into `(source, destination)` pairs.
    ///
    /// Trees are walked in file name order, so the result is stable across
    /// runs. Symlinks are followed so a linked file contributes its content.
    ///
    /// # Errors
    ///
    /// Fails if the destination is not a safe relative path, a pattern is
    /// invalid, or the tree cannot be walked.
    pub fn expand(&self) -> Result<Vec<(PathBuf, EntryPath)>> {
        match self {
            Self::File { source, dest } => {
                let dest = EntryPath::parse(dest).ok_or_else(|| Error::UnsafeEntryPath {
                    archive: source.clone(),
                    entry: dest.clone(),
                })?;
                Ok(vec![(source.clone(), dest)])
            }
            Self::Tree { root, includes } => {
                let includes = PatternSet::new(includes)?;
                let mut files = Vec::new();
                for entry in WalkDir::new(root)
                    .follow_links(true)
                    .sort_by_file_name()
                    .min_depth(1)
                {
                    let entry = entry.map_err(|e| walk_error(root, e))?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let relative = entry
                        .path()
                        .strip_prefix(root)
                        .map_err(|_| Error::InvalidConfig(format!(
                            "'{}' is not below '{}'",
                            entry.path().display(),
                            root.display()
                        )))?;
                    let relative = relative.to_string_lossy();
                    let dest =
                        EntryPath::parse(&relative).ok_or_else(|| Error::UnsafeEntryPath {
                            archive: root.clone(),
                            entry: relative.to_string(),
                        })?;
                    if includes.is_empty() || includes.matches_entry(&dest) {
                        files.push((entry.path().to_path_buf(), dest));
                    }
                }
                Ok(files)
            }
        }
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(source) => Error::file(FileOperation::ReadDir, path, source),
        None => Error::InvalidConfig(format!(
            "filesystem loop while walking '{}'",
            path.display()
        )),
    }
}

/// Everything one patch run needs.
///
/// Build it with [`PatchSpec::new`] and the chained setters. Nothing is
/// validated until it is run; pattern and path errors surface from
/// [`crate::patch`] before any output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSpec {
    base_archive: PathBuf,
    excludes: Vec<String>,
    secondary_archives: Vec<PathBuf>,
    secondary_rules: Vec<SecondaryRule>,
    loose_files: Vec<LooseFile>,
    output_dir: PathBuf,
}

impl PatchSpec {
    /// Creates a spec copying `base_archive` unchanged into `output_dir`.
    pub fn new(base_archive: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_archive: base_archive.into(),
            excludes: Vec::new(),
            secondary_archives: Vec::new(),
            secondary_rules: Vec::new(),
            loose_files: Vec::new(),
            output_dir: output_dir.into(),
        }
    }

    /// Adds an exclude pattern for base archive entries.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Adds several exclude patterns.
    pub fn exclude_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds a secondary archive candidate.
    pub fn secondary_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary_archives.push(path.into());
        self
    }

    /// Adds several secondary archive candidates.
    pub fn secondary_archive_all<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.secondary_archives
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds an include rule for candidates whose file name starts with `prefix`.
    ///
    /// Rules apply in the order they are added.
    pub fn include_from<I, S>(mut self, prefix: impl Into<String>, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_rules
            .push(SecondaryRule::new(prefix, includes));
        self
    }

    /// Adds a prebuilt include rule.
    pub fn rule(mut self, rule: SecondaryRule) -> Self {
        self.secondary_rules.push(rule);
        self
    }

    /// Adds a loose file source.
    pub fn loose_file(mut self, file: LooseFile) -> Self {
        self.loose_files.push(file);
        self
    }

    /// Returns the base archive path.
    pub fn base_archive(&self) -> &Path {
        &self.base_archive
    }

    /// Returns the exclude patterns.
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Returns the secondary archive candidates.
    pub fn secondary_archives(&self) -> &[PathBuf] {
        &self.secondary_archives
    }

    /// Returns the include rules in application order.
    pub fn secondary_rules(&self) -> &[SecondaryRule] {
        &self.secondary_rules
    }

    /// Returns the loose file sources.
    pub fn loose_files(&self) -> &[LooseFile] {
        &self.loose_files
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Picks the only candidate whose file name starts with `prefix`.
///
/// # Errors
///
/// Returns [`Error::ArchiveSelection`] when no candidate or more than one
/// candidate matches.
///
/// # Example
///
/// ```rust
/// use std::path::PathBuf;
/// use archpatch::select_single;
///
/// let candidates = [
///     PathBuf::from("libs/stdlib-1.3.jar"),
///     PathBuf::from("libs/compiler-embeddable-1.3.jar"),
/// ];
/// let base = select_single(&candidates, "compiler-embeddable-").unwrap();
/// assert_eq!(base, candidates[1]);
/// ```
pub fn select_single(candidates: &[PathBuf], prefix: &str) -> Result<PathBuf> {
    let mut matches: Vec<PathBuf> = candidates
        .iter()
        .filter(|path| file_name_starts_with(path, prefix))
        .cloned()
        .collect();
    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else {
        Err(Error::ArchiveSelection {
            prefix: prefix.to_string(),
            matches,
        })
    }
}

fn file_name_starts_with(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(prefix))
        .unwrap_or(false)
}

/// Checks that a source path for a loose file exists and is a file.
pub(crate) fn check_loose_source(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).with_path(FileOperation::Metadata, path)?;
    if metadata.is_file() {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "loose file '{}' is not a regular file",
            path.display()
        )))
    }
}
