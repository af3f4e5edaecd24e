// src/engine/reactor.rs

//! Per-event reaction policy.
//!
//! Every event yields exactly one [`Report`]. Failures are never propagated:
//! the stream is lossy, so an event that cannot be applied becomes a
//! diagnostic and processing moves on.
//!
//! Ordering rules:
//! - directory create: resolve parent, add the kernel watch, then insert.
//!   A failed add never inserts, so the index cannot reference a handle the
//!   kernel does not know.
//! - directory delete: the erase resolves the path before removing the
//!   entry, then the freed handle is released. This holds for orphans too,
//!   entries whose parent was deleted first.
//!
//! A new directory only gets its watch after its create event is read.
//! Entries created inside it before that are never reported, and events for
//! directories whose creation was missed arrive with a parent handle the
//! index does not know. Both show up as diagnostics, not as silent drops.

use std::ffi::{OsStr, OsString};

use tracing::{debug, warn};

use crate::errors::IndexError;
use crate::index::WatchIndex;
use crate::report::{Report, Severity};
use crate::subsystem::{Event, WatchRegistry};
use crate::types::{ParentHandle, WatchHandle};

#[derive(Debug, Default)]
pub struct EventReactor {
    index: WatchIndex,
}

impl EventReactor {
    pub fn index(&self) -> &WatchIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut WatchIndex {
        &mut self.index
    }

    /// Apply one event to the index and return its report.
    pub fn react<R>(&mut self, event: Event, registry: &mut R) -> Report
    where
        R: WatchRegistry + ?Sized,
    {
        debug!(?event, "reacting to event");

        match event {
            Event::Create {
                parent,
                name,
                is_directory: true,
            } => self.directory_created(parent, name, registry),
            Event::Create {
                parent,
                name,
                is_directory: false,
            } => self.file_changed(parent, &name, FileChange::Created),
            Event::Delete {
                parent,
                name,
                is_directory: true,
            } => self.directory_deleted(parent, &name, registry),
            Event::Delete {
                parent,
                name,
                is_directory: false,
            } => self.file_changed(parent, &name, FileChange::Deleted),
            Event::WatchRemoved { handle } => self.watch_removed(handle),
            Event::Overflow => {
                warn!("inotify queue overflow");
                Report::diagnostic(
                    Severity::DataLoss,
                    "event queue overflowed; events were dropped and the watch index may be stale",
                )
            }
        }
    }

    fn directory_created<R>(&mut self, parent: WatchHandle, name: OsString, registry: &mut R) -> Report
    where
        R: WatchRegistry + ?Sized,
    {
        let parent_path = match self.index.resolve(parent) {
            Ok(path) => path,
            Err(err) => return unresolved_parent("directory", "created", parent, &name, &err),
        };
        let path = parent_path.join(&name);

        let handle = match registry.add_watch(&path) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(?path, error = %err, "could not watch new directory");
                return Report::diagnostic(
                    Severity::Warning,
                    format!(
                        "could not watch new directory {}: {err}; its contents will not be tracked",
                        path.display()
                    ),
                );
            }
        };

        match self.index.insert(ParentHandle::Watch(parent), name, handle) {
            Ok(()) => {
                debug!(%handle, ?path, "watching new directory");
                Report::DirectoryCreated { path }
            }
            Err(err) => {
                // The kernel hands back an existing handle when the inode is
                // already watched; only release a handle nothing refers to.
                if !self.index.contains(handle) {
                    if let Err(rm_err) = registry.remove_watch(handle) {
                        debug!(%handle, error = %rm_err, "could not release unindexed watch");
                    }
                }
                warn!(?path, %handle, error = %err, "new directory not indexed");
                Report::diagnostic(
                    Severity::Warning,
                    format!("new directory {} not indexed: {err}", path.display()),
                )
            }
        }
    }

    fn directory_deleted<R>(&mut self, parent: WatchHandle, name: &OsStr, registry: &mut R) -> Report
    where
        R: WatchRegistry + ?Sized,
    {
        // An ancestor deleted before this directory leaves an orphan: still
        // indexed and still watched, but without a full path.
        let parent_path = self.index.resolve(parent);

        match self.index.erase(ParentHandle::Watch(parent), name) {
            Ok((path, handle)) => {
                // Usually fails: the kernel drops the watch of a removed
                // directory on its own.
                if let Err(err) = registry.remove_watch(handle) {
                    debug!(%handle, error = %err, "watch already released");
                }
                match parent_path {
                    Ok(_) => Report::DirectoryDeleted { path },
                    Err(err) => {
                        warn!(%parent, %handle, ?path, error = %err, "released orphaned watch");
                        Report::diagnostic(
                            Severity::Warning,
                            format!(
                                "directory {} deleted after its parent watch {parent} was                                  released ({err}); entry and watch {handle} released",
                                path.display()
                            ),
                        )
                    }
                }
            }
            Err(err) => {
                warn!(%parent, ?name, error = %err, "deleted directory was not indexed");
                Report::diagnostic(
                    Severity::Warning,
                    format!("deleted directory {name:?} under watch {parent} was not indexed: {err}"),
                )
            }
        }
    }

    fn file_changed(&self, parent: WatchHandle, name: &OsStr, change: FileChange) -> Report {
        match self.index.resolve(parent) {
            Ok(dir) => {
                let path = dir.join(name);
                match change {
                    FileChange::Created => Report::FileCreated { path },
                    FileChange::Deleted => Report::FileDeleted { path },
                }
            }
            Err(err) => unresolved_parent("file", change.verb(), parent, name, &err),
        }
    }

    fn watch_removed(&self, handle: WatchHandle) -> Report {
        let message = match self.index.resolve(handle) {
            Ok(path) => format!(
                "kernel released watch {handle} for {}; entry kept until its deletion is reported",
                path.display()
            ),
            Err(_) if self.index.contains(handle) => format!(
                "kernel released watch {handle}; entry kept until its deletion is reported"
            ),
            Err(_) => format!("kernel released watch {handle}"),
        };
        Report::diagnostic(Severity::Info, message)
    }
}

#[derive(Debug, Clone, Copy)]
enum FileChange {
    Created,
    Deleted,
}

impl FileChange {
    fn verb(self) -> &'static str {
        match self {
            FileChange::Created => "created",
            FileChange::Deleted => "deleted",
        }
    }
}

fn unresolved_parent(
    kind: &str,
    verb: &str,
    parent: WatchHandle,
    name: &OsStr,
    err: &IndexError,
) -> Report {
    warn!(%parent, ?name, error = %err, "event under unresolved watch");
    Report::diagnostic(
        Severity::Warning,
        format!(
            "{kind} {name:?} {verb} under unresolved watch {parent} ({err}); \
             the directory's creation was not observed, so no path can be reported"
        ),
    )
}
