// src/engine/runtime.rs

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::lifecycle::{bootstrap, teardown};
use crate::engine::reactor::EventReactor;
use crate::errors::Result;
use crate::report::{EventTotals, Report, RunSummary};
use crate::subsystem::{Event, NotificationSubsystem};

/// Pause before retrying after a failed read.
const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Async shell around [`EventReactor`].
///
/// Waits for the subsystem to deliver a batch, runs every event of the batch
/// through the reactor in order, and forwards the reports. A batch is
/// processed without yielding, so cancellation is only observed between
/// batches.
pub struct Runtime<S: NotificationSubsystem> {
    reactor: EventReactor,
    subsystem: S,
    reports: mpsc::UnboundedSender<Report>,
    cancel: CancellationToken,
    totals: EventTotals,
}

impl<S: NotificationSubsystem> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("reactor", &self.reactor)
            .field("totals", &self.totals)
            .finish_non_exhaustive()
    }
}

impl<S: NotificationSubsystem> Runtime<S> {
    pub fn new(
        subsystem: S,
        reports: mpsc::UnboundedSender<Report>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reactor: EventReactor::default(),
            subsystem,
            reports,
            cancel,
            totals: EventTotals::default(),
        }
    }

    /// Watch `root` until cancelled or until the subsystem closes, then
    /// release every watch.
    ///
    /// Only a failed root watch is an error; everything after that is
    /// reported and absorbed.
    pub async fn run(mut self, root: &Path) -> Result<RunSummary> {
        bootstrap(self.reactor.index_mut(), &mut self.subsystem, root)?;
        info!(?root, "treewatch runtime started");

        loop {
            let batch = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                batch = self.subsystem.next_batch() => batch,
            };

            match batch {
                Ok(Some(events)) => self.process_batch(events),
                Ok(None) => {
                    info!("notification subsystem closed");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "reading events failed; retrying");
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            info!("shutdown requested");
                            break;
                        }
                        _ = tokio::time::sleep(READ_RETRY_DELAY) => {}
                    }
                }
            }
        }

        let index_before_teardown = self.reactor.index().count();
        let teardown = teardown(self.reactor.index_mut(), &mut self.subsystem);
        let index_after_teardown = self.reactor.index().count();

        info!("treewatch runtime exiting");
        Ok(RunSummary {
            totals: self.totals,
            teardown,
            index_before_teardown,
            index_after_teardown,
        })
    }

    fn process_batch(&mut self, events: Vec<Event>) {
        debug!(events = events.len(), "processing batch");
        for event in events {
            let report = self.reactor.react(event, &mut self.subsystem);
            self.emit(report);
        }
    }

    fn emit(&mut self, report: Report) {
        self.totals.record(&report);
        if self.reports.send(report).is_err() {
            debug!("report receiver dropped");
        }
    }
}
