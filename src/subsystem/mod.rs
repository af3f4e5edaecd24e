// src/subsystem/mod.rs

//! Interface to the kernel notification subsystem.
//!
//! The reactor only needs to add and remove watches, which is the synchronous
//! [`WatchRegistry`] half. The runtime additionally waits for and reads event
//! batches through [`NotificationSubsystem`].
//!
//! - [`codec`] maps kernel records onto [`Event`]s.
//! - [`inotify`] is the Linux implementation used in production.
//!
//! Tests swap in a scripted fake (see `treewatch-test-utils`).

#[cfg(target_os = "linux")]
pub mod codec;
#[cfg(target_os = "linux")]
pub mod inotify;

use std::ffi::OsString;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::errors::SubsystemError;
use crate::types::WatchHandle;

#[cfg(target_os = "linux")]
pub use self::inotify::Inotify;

/// One decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `name` appeared inside the directory watched by `parent`.
    Create {
        parent: WatchHandle,
        name: OsString,
        is_directory: bool,
    },
    /// `name` was removed from the directory watched by `parent`.
    Delete {
        parent: WatchHandle,
        name: OsString,
        is_directory: bool,
    },
    /// The kernel queue overflowed and events were dropped.
    Overflow,
    /// The kernel removed `handle` (explicit removal, directory gone, unmount).
    WatchRemoved { handle: WatchHandle },
}

/// Future returned by [`NotificationSubsystem::next_batch`].
///
/// `Ok(None)` means the subsystem is closed and will deliver nothing more.
pub type BatchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<Vec<Event>>, SubsystemError>> + Send + 'a>>;

/// Adding and removing per-directory watches.
pub trait WatchRegistry {
    /// Start watching `path` for entries being created or deleted.
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, SubsystemError>;

    /// Stop watching `handle`. Fails if the kernel has already dropped it.
    fn remove_watch(&mut self, handle: WatchHandle) -> Result<(), SubsystemError>;
}

/// A notification subsystem that also delivers events.
pub trait NotificationSubsystem: WatchRegistry + Send {
    /// Wait until events are available, then read and decode one batch.
    ///
    /// Must be cancel safe: dropping the future before it resolves must not
    /// lose events.
    fn next_batch(&mut self) -> BatchFuture<'_>;
}
