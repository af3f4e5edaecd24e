use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use treewatch::engine::Runtime;
use treewatch::errors::{SubsystemError, TreewatchError};
use treewatch::report::{Report, Severity};
use treewatch::subsystem::Event;
use treewatch::types::WatchHandle;
use treewatch_test_utils::builders::{dir_created, dir_deleted, file_created};
use treewatch_test_utils::{FakeSubsystem, init_tracing, with_timeout};

const ROOT: WatchHandle = WatchHandle(1);

async fn next_report(rx: &mut mpsc::UnboundedReceiver<Report>) -> Report {
    with_timeout(rx.recv()).await.expect("report channel closed")
}

#[tokio::test]
async fn processes_batches_until_subsystem_closes() {
    init_tracing();
    let (fake, feed) = FakeSubsystem::with_feed();
    let probe = fake.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Handles are predictable: root = 1, "a" = 2.
    feed.send_batch(vec![dir_created(ROOT, "a")]);
    feed.send_batch(vec![
        file_created(WatchHandle(2), "x.txt"),
        Event::Overflow,
    ]);
    feed.send_batch(vec![dir_deleted(ROOT, "a")]);
    drop(feed);

    let runtime = Runtime::new(fake, tx, CancellationToken::new());
    let summary = with_timeout(runtime.run(Path::new("tmp"))).await.unwrap();

    let mut reports = Vec::new();
    while let Ok(report) = rx.try_recv() {
        reports.push(report);
    }

    assert_eq!(reports.len(), 4);
    assert_eq!(
        reports[0],
        Report::DirectoryCreated {
            path: PathBuf::from("tmp/a")
        }
    );
    assert_eq!(
        reports[1],
        Report::FileCreated {
            path: PathBuf::from("tmp/a/x.txt")
        }
    );
    assert_eq!(reports[2].severity(), Some(Severity::DataLoss));
    assert_eq!(
        reports[3],
        Report::DirectoryDeleted {
            path: PathBuf::from("tmp/a")
        }
    );

    assert_eq!(summary.totals.dir_events, 0);
    assert_eq!(summary.totals.file_events, 1);
    assert_eq!(summary.totals.data_loss, 1);
    assert_eq!(summary.index_before_teardown, (1, 1));
    assert_eq!(summary.index_after_teardown, (0, 0));
    assert_eq!(summary.teardown.released, 1);
    assert!(probe.live_watches().is_empty());
}

#[tokio::test]
async fn cancellation_is_observed_between_batches_and_tears_down() {
    init_tracing();
    let (fake, feed) = FakeSubsystem::with_feed();
    let probe = fake.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let runtime = Runtime::new(fake, tx, cancel.clone());
    let handle = tokio::spawn(async move { runtime.run(Path::new("tmp")).await });

    feed.send_batch(vec![dir_created(ROOT, "a"), dir_created(ROOT, "b")]);
    assert!(matches!(next_report(&mut rx).await, Report::DirectoryCreated { .. }));
    assert!(matches!(next_report(&mut rx).await, Report::DirectoryCreated { .. }));
    assert_eq!(probe.live_watches().len(), 3);

    // Feed stays open: only the token can end the run.
    cancel.cancel();
    let summary = with_timeout(handle).await.unwrap().unwrap();

    assert_eq!(summary.totals.dir_events, 2);
    assert_eq!(summary.index_before_teardown, (3, 3));
    assert_eq!(summary.teardown.released, 3);
    assert_eq!(summary.teardown.failed, 0);
    assert!(probe.live_watches().is_empty());
    drop(feed);
}

#[tokio::test]
async fn read_errors_are_retried() {
    init_tracing();
    let (fake, feed) = FakeSubsystem::with_feed();
    let (tx, mut rx) = mpsc::unbounded_channel();

    feed.send_error(SubsystemError::Read(std::io::Error::other("flaky")));
    feed.send_batch(vec![file_created(ROOT, "after-retry")]);
    drop(feed);

    let runtime = Runtime::new(fake, tx, CancellationToken::new());
    with_timeout(runtime.run(Path::new("tmp"))).await.unwrap();

    assert_eq!(
        next_report(&mut rx).await,
        Report::FileCreated {
            path: PathBuf::from("tmp/after-retry")
        }
    );
}

#[tokio::test]
async fn root_watch_failure_is_fatal() {
    init_tracing();
    let (fake, _feed) = FakeSubsystem::with_feed();
    fake.fail_add_for("does-not-exist");
    let (tx, _rx) = mpsc::unbounded_channel();

    let runtime = Runtime::new(fake, tx, CancellationToken::new());
    let result = with_timeout(runtime.run(Path::new("does-not-exist"))).await;

    assert!(matches!(result, Err(TreewatchError::RootWatch { .. })));
}

#[tokio::test]
async fn dropped_report_receiver_does_not_stop_processing() {
    init_tracing();
    let (fake, feed) = FakeSubsystem::with_feed();
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    feed.send_batch(vec![dir_created(ROOT, "a")]);
    drop(feed);

    let runtime = Runtime::new(fake, tx, CancellationToken::new());
    let summary = with_timeout(runtime.run(Path::new("tmp"))).await.unwrap();

    assert_eq!(summary.totals.dir_events, 1);
    assert_eq!(summary.index_before_teardown, (2, 2));
}
