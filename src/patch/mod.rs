//! The patch pipeline.
//!
//! A run has three layers, always applied in this order:
//!
//! 1. **Base**: every base archive entry not matching an exclude pattern.
//! 2. **Secondary**: for each include rule in declaration order, every file
//!    entry matching the rule's patterns in each secondary archive whose
//!    file name starts with the rule's prefix.
//! 3. **Loose**: loose files, copied verbatim.
//!
//! A later layer overwrites an earlier one at the same relative path, so the
//! order decides which content wins.
//!
//! Before the output directory is touched, all patterns are compiled, loose
//! file sources are expanded and the base archive is opened. A bad pattern
//! or a missing base archive therefore leaves existing output as it was.
//! Once the output directory has been recreated, any failure stops the run
//! and leaves whatever was written so far; there is no rollback.
//!
//! # Example
//!
//! ```rust,no_run
//! use archpatch::{PatchSpec, patch};
//!
//! let spec = PatchSpec::new("libs/compiler-1.3.jar", "build/patched")
//!     .exclude("META-INF/native/**/*jansi.*")
//!     .secondary_archive("libs/jansi-1.18.jar")
//!     .include_from("jansi-", ["META-INF/native/**"]);
//!
//! let result = patch(&spec)?;
//! println!(
//!     "{} base entries ({} excluded), {} from secondary archives",
//!     result.base_entries_copied, result.base_entries_excluded, result.secondary_entries_copied
//! );
//! # Ok::<(), archpatch::Error>(())
//! ```

mod archive;
mod output;

use std::path::PathBuf;

use crate::clean::recreate_dir;
use crate::pattern::{Filter, PatternSet};
use crate::progress::{Phase, ProgressReporter};
use crate::config::{PatchSpec, SecondaryRule, check_loose_source};
use crate::{EntryPath, Result};

use archive::{SourceArchive, require_path};
use output::{OutputDir, Written};

/// Options for a patch run.
#[derive(Default)]
pub struct PatchOptions {
    /// Progress reporter.
    pub progress: Option<Box<dyn ProgressReporter>>,
}

impl PatchOptions {
    /// Creates default options (no progress reporting).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }
}

impl std::fmt::Debug for PatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchOptions")
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Statistics of a completed patch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchResult {
    /// File entries copied from the base archive.
    pub base_entries_copied: usize,
    /// Base archive entries (files and directories) dropped by excludes.
    pub base_entries_excluded: usize,
    /// Directory entries of the base archive created in the output.
    pub directories_created: usize,
    /// Secondary archives opened.
    pub secondary_archives_read: usize,
    /// File entries copied from secondary archives.
    pub secondary_entries_copied: usize,
    /// Loose files copied.
    pub loose_files_copied: usize,
    /// Files written over a file from an earlier layer.
    pub files_overwritten: usize,
    /// Total bytes written.
    pub bytes_written: u64,
}

impl PatchResult {
    /// Returns the number of file writes across all layers.
    pub fn entries_written(&self) -> usize {
        self.base_entries_copied + self.secondary_entries_copied + self.loose_files_copied
    }

    fn record(&mut self, written: Written) {
        self.bytes_written += written.bytes;
        if written.overwritten {
            self.files_overwritten += 1;
        }
    }
}

/// Runs a patch with default options.
///
/// # Errors
///
/// Any I/O failure, unreadable archive, unsafe entry name or invalid pattern
/// aborts the run. See the [module documentation](self) for what is left in
/// the output directory in each case.
pub fn patch(spec: &PatchSpec) -> Result<PatchResult> {
    patch_with_options(spec, PatchOptions::default())
}

/// Runs a patch with custom options.
pub fn patch_with_options(spec: &PatchSpec, options: PatchOptions) -> Result<PatchResult> {
    let plan = Plan::prepare(spec)?;
    let mut progress = options.progress;
    let mut result = PatchResult::default();

    log::debug!("Recreating {}", spec.output_dir().display());
    recreate_dir(spec.output_dir())?;
    let mut out = OutputDir::new(spec.output_dir());

    let Plan {
        mut base,
        excludes,
        rules,
        loose,
    } = plan;

    notify_phase(&mut progress, Phase::Base);
    copy_base(&mut base, &excludes, &mut out, &mut result, &mut progress)?;
    drop(base);

    notify_phase(&mut progress, Phase::Secondary);
    for (rule, includes) in &rules {
        copy_secondary(
            spec.secondary_archives(),
            rule,
            includes,
            &mut out,
            &mut result,
            &mut progress,
        )?;
    }

    notify_phase(&mut progress, Phase::Loose);
    for (source, dest) in &loose {
        check_loose_source(source)?;
        let written = out.copy_file(source, dest)?;
        result.loose_files_copied += 1;
        result.record(written);
        notify_entry(&mut progress, Phase::Loose, dest.as_str(), written.bytes);
    }

    log::debug!(
        "Patched {} into {}: {} files written, {} overwritten, {} bytes",
        spec.base_archive().display(),
        spec.output_dir().display(),
        result.entries_written(),
        result.files_overwritten,
        result.bytes_written
    );
    if let Some(progress) = progress.as_mut() {
        progress.on_finish(&result);
    }
    Ok(result)
}

/// Everything validated before the output directory is touched.
struct Plan {
    base: SourceArchive,
    excludes: Filter,
    rules: Vec<(SecondaryRule, Filter)>,
    loose: Vec<(PathBuf, EntryPath)>,
}

impl Plan {
    fn prepare(spec: &PatchSpec) -> Result<Self> {
        let excludes = Filter::exclude(PatternSet::new(spec.excludes())?);
        let rules = spec
            .secondary_rules()
            .iter()
            .map(|rule| Ok((rule.clone(), Filter::include(PatternSet::new(rule.includes())?))))
            .collect::<Result<Vec<_>>>()?;

        let mut loose = Vec::new();
        for file in spec.loose_files() {
            loose.extend(file.expand()?);
        }

        let base = SourceArchive::open(spec.base_archive())?;
        Ok(Self {
            base,
            excludes,
            rules,
            loose,
        })
    }
}

fn copy_base(
    base: &mut SourceArchive,
    excludes: &Filter,
    out: &mut OutputDir<'_>,
    result: &mut PatchResult,
    progress: &mut Option<Box<dyn ProgressReporter>>,
) -> Result<()> {
    let archive_path = base.path().to_path_buf();
    base.for_each_entry(|entry| {
        let keep = match &entry.path {
            Some(path) => excludes.accepts_entry(path),
            None => excludes.accepts(entry.name),
        };
        if !keep {
            log::trace!("Excluded {}", entry.name);
            result.base_entries_excluded += 1;
            return Ok(());
        }

        let path = require_path(&entry.path, entry.name, &archive_path)?;
        if entry.is_dir {
            out.create_dir(path)?;
            result.directories_created += 1;
            notify_entry(progress, Phase::Base, path.as_str(), 0);
        } else {
            let written = out.write_file(path, entry.reader, &archive_path)?;
            result.base_entries_copied += 1;
            result.record(written);
            notify_entry(progress, Phase::Base, path.as_str(), written.bytes);
        }
        Ok(())
    })
}

fn copy_secondary(
    candidates: &[PathBuf],
    rule: &SecondaryRule,
    includes: &Filter,
    out: &mut OutputDir<'_>,
    result: &mut PatchResult,
    progress: &mut Option<Box<dyn ProgressReporter>>,
) -> Result<()> {
    let selected = rule.select(candidates);
    if selected.is_empty() {
        log::debug!("No secondary archive starts with '{}'", rule.prefix());
    }

    for archive_path in selected {
        let mut archive = SourceArchive::open(archive_path)?;
        let copied = copy_included(&mut archive, includes, out, result, progress)?;
        result.secondary_archives_read += 1;
        log::debug!(
            "Copied {} of {} entries from {}",
            copied,
            archive.len(),
            archive_path.display()
        );
    }
    Ok(())
}

fn copy_included(
    archive: &mut SourceArchive,
    includes: &Filter,
    out: &mut OutputDir<'_>,
    result: &mut PatchResult,
    progress: &mut Option<Box<dyn ProgressReporter>>,
) -> Result<usize> {
    let archive_path = archive.path().to_path_buf();
    let mut copied = 0;
    archive.for_each_entry(|entry| {
        if entry.is_dir {
            return Ok(());
        }
        let included = match &entry.path {
            Some(path) => includes.accepts_entry(path),
            None => includes.accepts(entry.name),
        };
        if !included {
            return Ok(());
        }

        let path = require_path(&entry.path, entry.name, &archive_path)?;
        let written = out.write_file(path, entry.reader, &archive_path)?;
        result.secondary_entries_copied += 1;
        result.record(written);
        copied += 1;
        notify_entry(progress, Phase::Secondary, path.as_str(), written.bytes);
        Ok(())
    })?;
    Ok(copied)
}

fn notify_phase(progress: &mut Option<Box<dyn ProgressReporter>>, phase: Phase) {
    log::debug!("Starting {} phase", phase);
    if let Some(progress) = progress.as_mut() {
        progress.on_phase_start(phase);
    }
}

fn notify_entry(
    progress: &mut Option<Box<dyn ProgressReporter>>,
    phase: Phase,
    path: &str,
    bytes: u64,
) {
    log::trace!("[{}] {} ({} bytes)", phase, path, bytes);
    if let Some(progress) = progress.as_mut() {
        progress.on_entry(phase, path, bytes);
    }
}
