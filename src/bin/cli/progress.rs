//! Progress display for CLI operations.

use archpatch::{PatchResult, Phase, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

const MAX_NAME_WIDTH: usize = 48;

/// Spinner for a patch run, counting written entries per phase.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {prefix:>9} {pos:>6} files {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        };
        Self { bar }
    }

    /// Returns a handle to the underlying bar.
    ///
    /// The reporter itself is moved into the patch options, so the caller
    /// keeps this handle to finish the bar on failure.
    pub fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }
}

impl ProgressReporter for CliProgress {
    fn on_phase_start(&mut self, phase: Phase) {
        self.bar.set_prefix(phase.to_string());
    }

    fn on_entry(&mut self, _phase: Phase, path: &str, _bytes: u64) {
        self.bar.inc(1);
        self.bar.set_message(truncate_name(path, MAX_NAME_WIDTH));
    }

    fn on_finish(&mut self, _result: &PatchResult) {
        self.bar.finish_and_clear();
    }
}

/// Simple progress bar for single operations
pub struct SimpleProgress {
    bar: ProgressBar,
}

impl SimpleProgress {
    /// Creates a new simple progress bar
    pub fn new(total: u64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                    .map(|style| style.progress_chars("#>-"))
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        };

        Self { bar }
    }

    /// Increments the progress
    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    /// Sets the message
    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Finishes the progress bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Finishes with a message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}

/// Shortens `name` to at most `max` characters, keeping the end.
fn truncate_name(name: &str, max: usize) -> String {
    let count = name.chars().count();
    if count <= max {
        return name.to_string();
    }
    let tail: String = name.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}
