use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use treewatch::errors::SubsystemError;
use treewatch::subsystem::{BatchFuture, Event, NotificationSubsystem, WatchRegistry};
use treewatch::types::WatchHandle;

type FeedItem = Result<Vec<Event>, SubsystemError>;

/// Bookkeeping shared between a [`FakeSubsystem`] and the test that owns it.
#[derive(Debug, Default)]
struct FakeState {
    next_handle: i32,
    reuse_handles: bool,
    freed: BTreeSet<i32>,
    live: BTreeMap<WatchHandle, PathBuf>,
    added: Vec<(PathBuf, WatchHandle)>,
    removed: Vec<WatchHandle>,
    failed_removals: Vec<WatchHandle>,
    failing_paths: HashSet<PathBuf>,
}

/// An in-memory notification subsystem.
///
/// - hands out handles 1, 2, 3, ... like inotify
/// - optionally reuses the lowest freed handle first
/// - records every add/remove call
/// - delivers whatever batches the test pushes through its [`FakeFeed`];
///   closing the feed closes the subsystem
#[derive(Debug, Clone)]
pub struct FakeSubsystem {
    state: Arc<Mutex<FakeState>>,
    feed: Option<Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<FeedItem>>>>,
}

/// Test side of the fake's event stream.
#[derive(Debug, Clone)]
pub struct FakeFeed {
    tx: mpsc::UnboundedSender<FeedItem>,
}

impl FakeFeed {
    pub fn send_batch(&self, events: Vec<Event>) {
        self.tx.send(Ok(events)).expect("fake subsystem dropped");
    }

    pub fn send_error(&self, err: SubsystemError) {
        self.tx.send(Err(err)).expect("fake subsystem dropped");
    }
}

impl FakeSubsystem {
    /// A subsystem with no event stream: `next_batch` reports it closed.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                next_handle: 1,
                ..FakeState::default()
            })),
            feed: None,
        }
    }

    /// A subsystem whose batches are pushed by the test.
    pub fn with_feed() -> (Self, FakeFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut fake = Self::new();
        fake.feed = Some(Arc::new(tokio::sync::Mutex::new(rx)));
        (fake, FakeFeed { tx })
    }

    /// Hand out freed handles again, lowest first.
    pub fn reuse_handles(self) -> Self {
        self.state.lock().unwrap().reuse_handles = true;
        self
    }

    /// Make `add_watch` fail for `path`.
    pub fn fail_add_for(&self, path: impl Into<PathBuf>) {
        self.state.lock().unwrap().failing_paths.insert(path.into());
    }

    /// Forget a watch as if the kernel had dropped it on its own.
    pub fn drop_watch(&self, handle: WatchHandle) {
        let mut state = self.state.lock().unwrap();
        if state.live.remove(&handle).is_some() {
            state.freed.insert(handle.raw());
        }
    }

    pub fn live_watches(&self) -> BTreeMap<WatchHandle, PathBuf> {
        self.state.lock().unwrap().live.clone()
    }

    pub fn handle_for(&self, path: impl AsRef<Path>) -> Option<WatchHandle> {
        let path = path.as_ref();
        self.state
            .lock()
            .unwrap()
            .live
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(&h, _)| h)
    }

    pub fn added(&self) -> Vec<(PathBuf, WatchHandle)> {
        self.state.lock().unwrap().added.clone()
    }

    pub fn removed(&self) -> Vec<WatchHandle> {
        self.state.lock().unwrap().removed.clone()
    }

    pub fn failed_removals(&self) -> Vec<WatchHandle> {
        self.state.lock().unwrap().failed_removals.clone()
    }
}

impl Default for FakeSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchRegistry for FakeSubsystem {
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, SubsystemError> {
        let mut state = self.state.lock().unwrap();

        if state.failing_paths.contains(path) {
            return Err(SubsystemError::AddWatch {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }

        // Same path, same handle: inotify keys watches by inode.
        if let Some((&existing, _)) = state.live.iter().find(|(_, p)| p.as_path() == path) {
            return Ok(existing);
        }

        let reusable = if state.reuse_handles {
            state.freed.first().copied()
        } else {
            None
        };
        let raw = match reusable {
            Some(raw) => {
                state.freed.remove(&raw);
                raw
            }
            None => {
                let raw = state.next_handle;
                state.next_handle += 1;
                raw
            }
        };

        let handle = WatchHandle(raw);
        state.live.insert(handle, path.to_path_buf());
        state.added.push((path.to_path_buf(), handle));
        Ok(handle)
    }

    fn remove_watch(&mut self, handle: WatchHandle) -> Result<(), SubsystemError> {
        let mut state = self.state.lock().unwrap();

        if state.live.remove(&handle).is_none() {
            state.failed_removals.push(handle);
            return Err(SubsystemError::RemoveWatch {
                handle,
                source: io::Error::from(io::ErrorKind::InvalidInput),
            });
        }

        state.freed.insert(handle.raw());
        state.removed.push(handle);
        Ok(())
    }
}

impl NotificationSubsystem for FakeSubsystem {
    fn next_batch(&mut self) -> BatchFuture<'_> {
        let feed = self.feed.clone();
        Box::pin(async move {
            let Some(feed) = feed else {
                return Ok(None);
            };
            let mut rx = feed.lock().await;
            match rx.recv().await {
                Some(Ok(events)) => Ok(Some(events)),
                Some(Err(err)) => Err(err),
                None => Ok(None),
            }
        })
    }
}
