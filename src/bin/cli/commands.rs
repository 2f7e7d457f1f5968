//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use archpatch::clean::{RetryPolicy, delete_with_retry};
use archpatch::{Error, PatchOptions, Result, patch_with_options, select_single};

use crate::OutputFormat;
use crate::config::{AdditionalFile, PatchConfig};
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::progress::{CliProgress, SimpleProgress};

/// Arguments of the patch command.
pub struct PatchArgs<'a> {
    pub config: Option<&'a Path>,
    pub base: Option<&'a Path>,
    pub base_prefix: Option<&'a str>,
    pub candidates: &'a [PathBuf],
    pub output: Option<&'a Path>,
    pub excludes: &'a [String],
    pub secondaries: &'a [PathBuf],
    pub includes: &'a [(String, String)],
    pub adds: &'a [(String, String)],
    pub add_trees: &'a [PathBuf],
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Patch command implementation
pub fn patch(args: &PatchArgs<'_>) -> ExitCode {
    let formatter = create_formatter(args.format);

    let spec = match build_config(args).and_then(|config| config.into_spec()) {
        Ok(spec) => spec,
        Err(e) => return report_error(&e),
    };

    let progress = CliProgress::new(args.quiet || args.format == OutputFormat::Json);
    let bar = progress.bar();
    let options = PatchOptions::new().progress(progress);

    match patch_with_options(&spec, options) {
        Ok(result) => {
            if !args.quiet || args.format == OutputFormat::Json {
                print!("{}", formatter.format_patch_result(&spec, &result));
            }
            ExitCode::Success
        }
        Err(e) => {
            bar.abandon_with_message("Failed");
            report_error(&e)
        }
    }
}

/// Merges the configuration file (if any) with command-line flags.
///
/// Scalar flags replace configured values, list flags extend them.
fn build_config(args: &PatchArgs<'_>) -> Result<PatchConfig> {
    let mut config = match args.config {
        Some(path) => PatchConfig::load(path)?,
        None => PatchConfig::default(),
    };

    if let Some(base) = args.base {
        config.base_archive = Some(base.to_path_buf());
    } else if let Some(prefix) = args.base_prefix {
        config.base_archive = Some(select_single(args.candidates, prefix)?);
    }
    if let Some(output) = args.output {
        config.output_dir = Some(output.to_path_buf());
    }

    config.excludes.extend(args.excludes.iter().cloned());
    config
        .secondary_archives
        .extend(args.secondaries.iter().cloned());
    for (prefix, pattern) in args.includes {
        config.add_include(prefix, pattern);
    }
    for (source, dest) in args.adds {
        config.additional_files.push(AdditionalFile::File {
            source: PathBuf::from(source),
            dest: dest.clone(),
        });
    }
    for root in args.add_trees {
        config.additional_files.push(AdditionalFile::Tree {
            tree: root.clone(),
            includes: Vec::new(),
        });
    }

    if config.base_archive.is_none() {
        return Err(Error::InvalidConfig(
            "a base archive is required (--base, --base-prefix or a config file)".into(),
        ));
    }
    Ok(config)
}

/// Clean command implementation
pub fn clean(
    targets: &[PathBuf],
    attempts: u32,
    backoff_ms: u64,
    format: OutputFormat,
    quiet: bool,
) -> ExitCode {
    let formatter = create_formatter(format);
    let policy = RetryPolicy::new()
        .attempts(attempts)
        .backoff(Duration::from_millis(backoff_ms));

    let progress = SimpleProgress::new(
        targets.len() as u64,
        quiet || format == OutputFormat::Json,
    );
    progress.set_message("Cleaning");

    for target in targets {
        if let Err(e) = delete_with_retry(target, &policy) {
            progress.finish_with_message("Failed");
            return report_error(&e);
        }
        progress.inc(1);
    }
    progress.finish();

    if !quiet || format == OutputFormat::Json {
        print!("{}", formatter.format_clean_result(targets));
    }
    ExitCode::Success
}

fn report_error(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}
