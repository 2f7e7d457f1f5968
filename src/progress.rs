//! Progress reporting for patch runs.
//!
//! A [`ProgressReporter`] is notified when each phase starts and after each
//! entry or loose file is written. All methods have no-op defaults, so
//! implementations only override what they need.
//!
//! # Example
//!
//! ```rust,ignore
//! use archpatch::{PatchOptions, PatchSpec, patch_with_options};
//! use archpatch::progress::progress_fn;
//!
//! let options = PatchOptions::new().progress(progress_fn(|phase, path, bytes| {
//!     println!("[{}] {} ({} bytes)", phase, path, bytes);
//! }));
//! patch_with_options(&spec, options)?;
//! ```

use std::fmt;

use crate::patch::PatchResult;

/// The three layers of a patch run, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Copying base archive entries that are not excluded.
    Base,
    /// Copying included entries from secondary archives.
    Secondary,
    /// Copying loose files.
    Loose,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Secondary => write!(f, "secondary"),
            Self::Loose => write!(f, "loose"),
        }
    }
}

/// Progress callbacks for a patch run.
pub trait ProgressReporter: Send {
    /// Called when a phase begins.
    fn on_phase_start(&mut self, phase: Phase) {
        let _ = phase;
    }

    /// Called after an entry has been written to the output directory.
    ///
    /// `bytes` is 0 for directories.
    fn on_entry(&mut self, phase: Phase, path: &str, bytes: u64) {
        let _ = (phase, path, bytes);
    }

    /// Called once after the last phase completed.
    fn on_finish(&mut self, result: &PatchResult) {
        let _ = result;
    }
}

/// A reporter that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// A reporter forwarding entry events to a closure.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(Phase, &str, u64) + Send,
{
    fn on_entry(&mut self, phase: Phase, path: &str, bytes: u64) {
        (self.callback)(phase, path, bytes)
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(Phase, &str, u64) + Send,
{
    ClosureProgress { callback: f }
}
