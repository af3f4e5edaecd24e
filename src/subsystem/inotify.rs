// src/subsystem/inotify.rs

//! Linux inotify backend.
//!
//! The `inotify` crate opens the descriptor non-blocking; it is registered
//! with the tokio reactor, so waiting for data is `AsyncFd::readable_mut`
//! and the read itself never blocks.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use ::inotify::{Inotify as KernelInotify, WatchDescriptor, WatchMask};
use tokio::io::unix::AsyncFd;
use tracing::{debug, trace};

use crate::errors::SubsystemError;
use crate::subsystem::codec::{RawEvent, translate};
use crate::subsystem::{BatchFuture, NotificationSubsystem, WatchRegistry};
use crate::types::WatchHandle;

/// Events requested for every watched directory. `ONLYDIR` makes the add
/// fail if a directory was replaced by something else before we got to it.
pub fn watch_mask() -> WatchMask {
    WatchMask::CREATE | WatchMask::DELETE | WatchMask::ONLYDIR
}

/// `struct inotify_event` without its name.
const EVENT_HEADER_LEN: usize = 16;

/// Longest name the kernel can report, excluding the terminating NUL.
const NAME_MAX: usize = 255;

/// Upper bound for a single record.
const MAX_RECORD_LEN: usize = EVENT_HEADER_LEN + NAME_MAX + 1;

#[derive(Debug)]
pub struct Inotify {
    fd: AsyncFd<KernelInotify>,
    /// Descriptors handed out by `add_watch`, needed again to remove them.
    descriptors: HashMap<WatchHandle, WatchDescriptor>,
    buffer: Vec<u8>,
}

impl Inotify {
    /// Create the inotify instance.
    ///
    /// `buffer_events` sizes the read buffer in maximum-size records. Must be
    /// called from within a tokio runtime.
    pub fn init(buffer_events: usize) -> Result<Self, SubsystemError> {
        let inner = KernelInotify::init().map_err(SubsystemError::Init)?;
        let fd = AsyncFd::new(inner).map_err(SubsystemError::Init)?;

        let buffer = vec![0u8; buffer_events.max(1) * MAX_RECORD_LEN];
        debug!(buffer_len = buffer.len(), "inotify initialised");

        Ok(Self {
            fd,
            descriptors: HashMap::new(),
            buffer,
        })
    }
}

impl WatchRegistry for Inotify {
    fn add_watch(&mut self, path: &Path) -> Result<WatchHandle, SubsystemError> {
        let wd = self
            .fd
            .get_ref()
            .watches()
            .add(path, watch_mask())
            .map_err(|source| SubsystemError::AddWatch {
                path: path.to_path_buf(),
                source,
            })?;

        let handle = WatchHandle(wd.get_watch_descriptor_id());
        trace!(%handle, ?path, "inotify watch added");
        // A handle the kernel reused replaces the stale descriptor.
        self.descriptors.insert(handle, wd);
        Ok(handle)
    }

    fn remove_watch(&mut self, handle: WatchHandle) -> Result<(), SubsystemError> {
        let wd = self
            .descriptors
            .remove(&handle)
            .ok_or_else(|| SubsystemError::RemoveWatch {
                handle,
                source: io::Error::from(io::ErrorKind::NotFound),
            })?;

        self.fd
            .get_ref()
            .watches()
            .remove(wd)
            .map_err(|source| SubsystemError::RemoveWatch { handle, source })?;

        trace!(%handle, "inotify watch removed");
        Ok(())
    }
}

impl NotificationSubsystem for Inotify {
    fn next_batch(&mut self) -> BatchFuture<'_> {
        let fd = &mut self.fd;
        let buffer = &mut self.buffer;

        Box::pin(async move {
            loop {
                let mut guard = fd.readable_mut().await.map_err(SubsystemError::Read)?;

                let result = guard.try_io(|inner| {
                    let records = inner.get_mut().read_events(buffer.as_mut_slice())?;
                    Ok(records.map(|event| RawEvent::from_kernel(&event)).collect::<Vec<_>>())
                });

                match result {
                    Ok(Ok(records)) => {
                        let read = records.len();
                        let events = translate(records);
                        trace!(records = read, events = events.len(), "read inotify batch");
                        return Ok(Some(events));
                    }
                    Ok(Err(err)) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Ok(Err(err)) => return Err(SubsystemError::Read(err)),
                    // Readiness was stale; `try_io` already cleared it.
                    Err(_would_block) => continue,
                }
            }
        })
    }
}
