// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `treewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "treewatch",
    version,
    about = "Report files and directories created or deleted under a directory tree.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to monitor.
    ///
    /// Overrides `[watch].root`; defaults to `./tmp`.
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Path to a config file (TOML).
    ///
    /// If omitted, `Treewatch.toml` in the current directory is used when it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read buffer capacity, in maximum-size event records.
    #[arg(long, value_name = "N")]
    pub buffer_events: Option<usize>,

    /// Don't print totals and index sizes on exit.
    #[arg(long)]
    pub no_summary: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TREEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the effective configuration and exit without watching.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
