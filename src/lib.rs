// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod index;
pub mod logging;
pub mod report;
pub mod subsystem;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default, validate_config};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - the inotify subsystem
/// - the runtime and the report printer
/// - Ctrl-C handling
/// - the exit summary
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let cfg = effective_config(&args, &cwd)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    watch(cfg).await
}

/// Load the config file (if any) and apply command-line overrides.
pub fn effective_config(args: &CliArgs, cwd: &Path) -> Result<ConfigFile> {
    let mut cfg = load_or_default(args.config.as_deref(), cwd).context("loading configuration")?;

    if let Some(root) = &args.root {
        cfg.watch.root = root.clone();
    }
    if let Some(n) = args.buffer_events {
        cfg.watch.buffer_events = n;
    }
    if args.no_summary {
        cfg.report.summary_on_exit = false;
    }

    validate_config(&cfg).context("validating configuration")?;
    Ok(cfg)
}

#[cfg(target_os = "linux")]
async fn watch(cfg: ConfigFile) -> Result<()> {
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;
    use tracing::info;

    use crate::engine::Runtime;
    use crate::report::{Report, print_reports};
    use crate::subsystem::Inotify;

    let subsystem = Inotify::init(cfg.watch.buffer_events)?;

    // Ctrl-C → cancel; observed by the runtime between batches.
    let cancel = CancellationToken::new();
    {
        let token = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received");
            token.cancel();
        });
    }

    let (report_tx, report_rx) = mpsc::unbounded_channel::<Report>();
    let printer = tokio::spawn(print_reports(report_rx));

    let runtime = Runtime::new(subsystem, report_tx, cancel);
    let summary = runtime.run(&cfg.watch.root).await?;

    // The runtime dropped its sender; wait for the printer to flush.
    printer.await.context("report printer panicked")?;

    if cfg.report.summary_on_exit {
        println!("cleaning up");
        println!("{summary}");
    }

    debug!(?summary, "session finished");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn watch(_cfg: ConfigFile) -> Result<()> {
    anyhow::bail!("treewatch needs inotify, which is only available on Linux")
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("treewatch dry-run");
    println!("  watch.root = {}", cfg.watch.root.display());
    println!("  watch.buffer_events = {}", cfg.watch.buffer_events);
    println!("  report.summary_on_exit = {}", cfg.report.summary_on_exit);

    debug!("dry-run complete (no watching)");
}
