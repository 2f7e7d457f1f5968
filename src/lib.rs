//! # archpatch
//!
//! Patch a ZIP (or JAR) archive into a directory.
//!
//! A patch run unpacks a *base archive* into an output directory while
//! dropping entries that match exclude patterns, overlays selected entries
//! from *secondary archives*, and finally copies *loose files* on top. The
//! output directory is recreated on every run, so the result depends only on
//! the inputs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use archpatch::{LooseFile, PatchSpec, Result, patch};
//!
//! fn main() -> Result<()> {
//!     let spec = PatchSpec::new("libs/compiler-1.3.jar", "build/patched")
//!         // Drop the native libraries bundled in the base archive
//!         .exclude("META-INF/native/**/*jansi.*")
//!         .exclude("org/fusesource/jansi/internal/CLibrary*")
//!         // Take them from the newer library instead
//!         .secondary_archive_all(["libs/jansi-2.4.0.jar", "libs/kotlin-stdlib.jar"])
//!         .include_from("jansi-", ["META-INF/native/**", "org/fusesource/jansi/internal/CLibrary*"])
//!         // And finally a hand-written replacement class
//!         .loose_file(LooseFile::file(
//!             "patches/Launcher.class",
//!             "org/example/Launcher.class",
//!         ));
//!
//!     let result = patch(&spec)?;
//!     println!("Wrote {} files", result.entries_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Layering
//!
//! | Phase | Source | Selection |
//! |-------|--------|-----------|
//! | 1 | base archive | every entry not matching an exclude |
//! | 2 | secondary archives | per rule: archives whose file name starts with the prefix, entries matching the includes |
//! | 3 | loose files | every file, verbatim |
//!
//! Later phases overwrite earlier ones. Within phase 2, rules apply in the
//! order they were added and archives in the order they were listed.
//!
//! ## Patterns
//!
//! Entry paths use `/` separators and are matched case-sensitively. `*`
//! matches within one path segment and `**` matches any number of segments.
//! See [`pattern`] for details.
//!
//! ## Cleaning
//!
//! [`clean`] removes stale output with a retry policy and never follows
//! symlinks.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for copying entry data (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod clean;
pub mod config;
pub mod entry_path;
pub mod error;
pub mod patch;
pub mod pattern;
pub mod progress;

pub use clean::RetryPolicy;
pub use config::{LooseFile, PatchSpec, SecondaryRule, select_single};
pub use entry_path::EntryPath;
pub use error::{Error, FileOperation, Result};
pub use patch::{PatchOptions, PatchResult, patch, patch_with_options};
pub use pattern::{PathPattern, PatternSet};
pub use progress::{NoProgress, Phase, ProgressReporter, progress_fn};
