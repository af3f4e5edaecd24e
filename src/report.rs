// src/report.rs

//! Reporting records produced by the reactor, and the stdout printer that
//! consumes them.
//!
//! Records describe what happened on disk; diagnostics describe what the
//! tracker could not do or could not see. Records go to stdout, diagnostics
//! go through `tracing` (stderr).

use std::fmt;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Nothing was lost; purely informational.
    Info,
    /// One event could not be applied; the index may be missing an entry.
    Warning,
    /// The kernel dropped events. The index may be stale in ways that
    /// cannot be reconstructed.
    DataLoss,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::DataLoss => "data-loss-possible",
        })
    }
}

/// One outcome of reacting to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// A directory was created and is now watched.
    ///
    /// Anything created inside it before the watch was installed has not
    /// been observed.
    DirectoryCreated { path: PathBuf },
    FileCreated { path: PathBuf },
    DirectoryDeleted { path: PathBuf },
    FileDeleted { path: PathBuf },
    Diagnostic { message: String, severity: Severity },
}

impl Report {
    pub fn diagnostic(severity: Severity, message: impl Into<String>) -> Self {
        Report::Diagnostic {
            message: message.into(),
            severity,
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Report::Diagnostic { .. })
    }

    /// Severity of a diagnostic, `None` for regular records.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Report::Diagnostic { severity, .. } => Some(*severity),
            _ => None,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::DirectoryCreated { path } => {
                write!(f, "New directory {} created.", path.display())
            }
            Report::FileCreated { path } => write!(f, "New file {} created.", path.display()),
            Report::DirectoryDeleted { path } => {
                write!(f, "Directory {} deleted.", path.display())
            }
            Report::FileDeleted { path } => write!(f, "File {} deleted.", path.display()),
            Report::Diagnostic { message, severity } => write!(f, "[{severity}] {message}"),
        }
    }
}

/// Running totals over the reports of one session.
///
/// Directory and file counts are net: a create adds one, a delete takes one
/// away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventTotals {
    pub dir_events: i64,
    pub file_events: i64,
    pub diagnostics: u64,
    pub data_loss: u64,
}

impl EventTotals {
    pub fn record(&mut self, report: &Report) {
        match report {
            Report::DirectoryCreated { .. } => self.dir_events += 1,
            Report::DirectoryDeleted { .. } => self.dir_events -= 1,
            Report::FileCreated { .. } => self.file_events += 1,
            Report::FileDeleted { .. } => self.file_events -= 1,
            Report::Diagnostic { severity, .. } => {
                self.diagnostics += 1;
                if *severity == Severity::DataLoss {
                    self.data_loss += 1;
                }
            }
        }
    }
}

/// Outcome of releasing every outstanding watch at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownSummary {
    pub released: usize,
    /// Handles the kernel had already dropped.
    pub failed: usize,
}

/// What a finished session looked like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub totals: EventTotals,
    pub teardown: TeardownSummary,
    /// `(forward, reverse)` sizes of the index right before teardown.
    pub index_before_teardown: (usize, usize),
    pub index_after_teardown: (usize, usize),
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "total dir events = {}, total file events = {}",
            self.totals.dir_events, self.totals.file_events
        )?;
        if self.totals.diagnostics > 0 {
            writeln!(
                f,
                "diagnostics = {} ({} possible data loss)",
                self.totals.diagnostics, self.totals.data_loss
            )?;
        }
        let (fwd, rev) = self.index_before_teardown;
        writeln!(f, "number of watches={fwd} & reverse watches={rev}")?;
        writeln!(
            f,
            "released {} watches ({} already gone)",
            self.teardown.released, self.teardown.failed
        )?;
        let (fwd, rev) = self.index_after_teardown;
        write!(f, "number of watches={fwd} & reverse watches={rev}")
    }
}

/// Print reports until the sending side is dropped.
pub async fn print_reports(mut rx: mpsc::UnboundedReceiver<Report>) {
    while let Some(report) = rx.recv().await {
        match &report {
            Report::Diagnostic { message, severity } => match severity {
                Severity::Info => info!(%severity, "{message}"),
                Severity::Warning => warn!(%severity, "{message}"),
                Severity::DataLoss => error!(%severity, "{message}"),
            },
            _ => println!("{report}"),
        }
    }
}
