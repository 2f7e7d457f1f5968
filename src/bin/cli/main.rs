//! CLI tool for archpatch.

mod commands;
mod config;
mod exit_codes;
mod output;
mod progress;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use archpatch::clean::{DEFAULT_ATTEMPTS, DEFAULT_BACKOFF};
use exit_codes::ExitCode;

/// Patch a ZIP archive into a directory
#[derive(Parser)]
#[command(name = "archpatch")]
#[command(author, version, about = "Patch a ZIP archive into a directory", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log phase and archive summaries (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack a base archive into a directory and layer patches on top
    Patch {
        /// JSON configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Base archive
        #[arg(short = 'b', long, conflicts_with = "base_prefix")]
        base: Option<PathBuf>,

        /// Pick the base archive among --candidate files by file name prefix
        #[arg(long, requires = "candidate")]
        base_prefix: Option<String>,

        /// Candidate archive for --base-prefix
        #[arg(long)]
        candidate: Vec<PathBuf>,

        /// Output directory (deleted and recreated)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Exclude base entries matching a pattern
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Secondary archive
        #[arg(short = 's', long)]
        secondary: Vec<PathBuf>,

        /// Include rule for secondary archives, as PREFIX=PATTERN
        #[arg(short = 'i', long, value_parser = parse_pair)]
        include: Vec<(String, String)>,

        /// Loose file, as SOURCE=DEST
        #[arg(short = 'a', long, value_parser = parse_pair)]
        add: Vec<(String, String)>,

        /// Directory whose files are added at their relative paths
        #[arg(long)]
        add_tree: Vec<PathBuf>,
    },

    /// Delete files or directories, retrying once on failure
    Clean {
        /// Paths to delete
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Total number of attempts per target
        #[arg(long, default_value_t = DEFAULT_ATTEMPTS)]
        attempts: u32,

        /// Delay between attempts in milliseconds
        #[arg(long, default_value_t = DEFAULT_BACKOFF.as_millis() as u64)]
        backoff_ms: u64,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Splits `KEY=VALUE` at the first `=`.
fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn main() {
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(ExitCode::UserInterrupt.code());
    })
    .ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let exit_code = match cli.command {
        Commands::Patch {
            config,
            base,
            base_prefix,
            candidate,
            output,
            exclude,
            secondary,
            include,
            add,
            add_tree,
        } => commands::patch(&commands::PatchArgs {
            config: config.as_deref(),
            base: base.as_deref(),
            base_prefix: base_prefix.as_deref(),
            candidates: &candidate,
            output: output.as_deref(),
            excludes: &exclude,
            secondaries: &secondary,
            includes: &include,
            adds: &add,
            add_trees: &add_tree,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Clean {
            targets,
            attempts,
            backoff_ms,
        } => commands::clean(&targets, attempts, backoff_ms, cli.format, cli.quiet),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
