//! Output formatting for CLI operations.

use serde_json::json;
use std::path::PathBuf;

use archpatch::{PatchResult, PatchSpec};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the summary of a patch run
    fn format_patch_result(&self, spec: &PatchSpec, result: &PatchResult) -> String;

    /// Formats the targets removed by a clean run
    fn format_clean_result(&self, targets: &[PathBuf]) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_patch_result(&self, spec: &PatchSpec, result: &PatchResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Patched {} into {}\n",
            spec.base_archive().display(),
            spec.output_dir().display()
        ));
        output.push_str(&format!(
            "  Base:       {} files, {} directories, {} excluded\n",
            result.base_entries_copied, result.directories_created, result.base_entries_excluded
        ));
        output.push_str(&format!(
            "  Secondary:  {} files from {} archives\n",
            result.secondary_entries_copied, result.secondary_archives_read
        ));
        output.push_str(&format!("  Loose:      {} files\n", result.loose_files_copied));
        if result.files_overwritten > 0 {
            output.push_str(&format!(
                "  Overwritten: {} files\n",
                result.files_overwritten
            ));
        }
        output.push_str(&format!(
            "  Total:      {} files, {}\n",
            result.entries_written(),
            humanize_bytes(result.bytes_written)
        ));

        output
    }

    fn format_clean_result(&self, targets: &[PathBuf]) -> String {
        let mut output = String::new();
        for target in targets {
            output.push_str(&format!("Deleted {}\n", target.display()));
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_patch_result(&self, spec: &PatchSpec, result: &PatchResult) -> String {
        let obj = json!({
            "success": true,
            "base_archive": spec.base_archive().display().to_string(),
            "output_dir": spec.output_dir().display().to_string(),
            "base_entries_copied": result.base_entries_copied,
            "base_entries_excluded": result.base_entries_excluded,
            "directories_created": result.directories_created,
            "secondary_archives_read": result.secondary_archives_read,
            "secondary_entries_copied": result.secondary_entries_copied,
            "loose_files_copied": result.loose_files_copied,
            "files_overwritten": result.files_overwritten,
            "entries_written": result.entries_written(),
            "bytes_written": result.bytes_written,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_clean_result(&self, targets: &[PathBuf]) -> String {
        let obj = json!({
            "success": true,
            "deleted": targets.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (PatchSpec, PatchResult) {
        let spec = PatchSpec::new("base.jar", "out");
        let result = PatchResult {
            base_entries_copied: 3,
            base_entries_excluded: 1,
            secondary_entries_copied: 2,
            secondary_archives_read: 1,
            loose_files_copied: 1,
            files_overwritten: 2,
            bytes_written: 2048,
            ..Default::default()
        };
        (spec, result)
    }

    #[test]
    fn test_humanize_bytes() {
        assert_eq!(humanize_bytes(0), "0 B");
        assert_eq!(humanize_bytes(1536), "1.5 KB");
        assert_eq!(humanize_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_human_patch_result() {
        let (spec, result) = sample();
        let text = HumanFormatter.format_patch_result(&spec, &result);
        assert!(text.contains("Patched base.jar into out"));
        assert!(text.contains("Overwritten: 2 files"));
        assert!(text.contains("6 files, 2.0 KB"));
    }

    #[test]
    fn test_json_patch_result() {
        let (spec, result) = sample();
        let text = JsonFormatter.format_patch_result(&spec, &result);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["entries_written"], 6);
        assert_eq!(value["files_overwritten"], 2);
        assert_eq!(value["base_archive"], "base.jar");
    }

    #[test]
    fn test_json_clean_result() {
        let text = JsonFormatter.format_clean_result(&[PathBuf::from("build/out")]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["deleted"][0], "build/out");
    }
}
