// src/index/mod.rs

//! Bidirectional index of live directory watches.
//!
//! Events name a directory by `(parent handle, name)` while the kernel names
//! it by its own handle. [`WatchIndex`] keeps both views:
//!
//! - forward: handle -> [`WatchEntry`] (used to rebuild paths)
//! - reverse: [`WatchEntry`] -> handle (used when a directory is deleted)
//!
//! The two maps are private and only change together, so every handle in the
//! forward view has exactly one reverse key and vice versa.

pub mod resolver;

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use tracing::trace;

use crate::errors::IndexError;
use crate::types::{ParentHandle, WatchHandle};

pub use resolver::{resolve_partial, resolve_path};

/// One watched directory: its parent link and its own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchEntry {
    pub parent: ParentHandle,
    pub name: OsString,
}

impl WatchEntry {
    pub fn new(parent: ParentHandle, name: impl Into<OsString>) -> Self {
        Self {
            parent,
            name: name.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct WatchIndex {
    forward: HashMap<WatchHandle, WatchEntry>,
    reverse: HashMap<WatchEntry, WatchHandle>,
}

impl WatchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `handle` watches the directory `name` inside `parent`.
    ///
    /// Fails without touching the index when the parent is not indexed, when
    /// `(parent, name)` already has a handle, or when `handle` is already in
    /// use by another entry.
    pub fn insert(
        &mut self,
        parent: ParentHandle,
        name: impl Into<OsString>,
        handle: WatchHandle,
    ) -> Result<(), IndexError> {
        if let ParentHandle::Watch(parent_handle) = parent {
            if !self.forward.contains_key(&parent_handle) {
                return Err(IndexError::UnknownParent(parent_handle));
            }
        }

        let entry = WatchEntry::new(parent, name);
        if let Some(&existing) = self.reverse.get(&entry) {
            return Err(IndexError::DuplicateEntry {
                parent,
                name: entry.name,
                existing,
            });
        }
        if self.forward.contains_key(&handle) {
            return Err(IndexError::DuplicateHandle(handle));
        }

        trace!(%handle, %parent, name = ?entry.name, "index insert");
        self.reverse.insert(entry.clone(), handle);
        self.forward.insert(handle, entry);
        Ok(())
    }

    /// Remove the entry for `(parent, name)`.
    ///
    /// Returns the entry's path, resolved before removal, and the freed
    /// handle so the caller can release it at the subsystem. Only a missing
    /// key fails. An entry whose ancestors are already gone is still removed;
    /// its path is then relative to the first missing ancestor (see
    /// [`resolver::resolve_partial`]).
    pub fn erase(
        &mut self,
        parent: ParentHandle,
        name: &OsStr,
    ) -> Result<(PathBuf, WatchHandle), IndexError> {
        let key = WatchEntry::new(parent, name);
        let handle = match self.reverse.get(&key) {
            Some(&handle) => handle,
            None => {
                return Err(IndexError::EntryNotFound {
                    parent,
                    name: key.name,
                });
            }
        };

        let (path, stopped) =
            resolve_partial(|h| self.forward.get(&h), self.forward.len(), handle);
        match stopped {
            None => trace!(%handle, %parent, ?name, "index erase"),
            Some(err) => trace!(%handle, %parent, ?name, error = %err, "index erase of orphan"),
        }

        self.reverse.remove(&key);
        self.forward.remove(&handle);
        Ok((path, handle))
    }

    /// Full path of a live handle.
    pub fn resolve(&self, handle: WatchHandle) -> Result<PathBuf, IndexError> {
        resolve_path(|h| self.forward.get(&h), self.forward.len(), handle)
    }

    /// Empty the index, returning every handle it held (ascending).
    pub fn drain(&mut self) -> Vec<WatchHandle> {
        self.reverse.clear();
        let mut handles: Vec<WatchHandle> = self.forward.drain().map(|(h, _)| h).collect();
        handles.sort_unstable();
        handles
    }

    /// Sizes of the forward and reverse views. Always equal.
    pub fn count(&self) -> (usize, usize) {
        (self.forward.len(), self.reverse.len())
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn contains(&self, handle: WatchHandle) -> bool {
        self.forward.contains_key(&handle)
    }

    pub fn get(&self, handle: WatchHandle) -> Option<&WatchEntry> {
        self.forward.get(&handle)
    }

    /// Handle for `(parent, name)`, if indexed.
    pub fn lookup(&self, parent: ParentHandle, name: &OsStr) -> Option<WatchHandle> {
        self.reverse.get(&WatchEntry::new(parent, name)).copied()
    }

    /// Read-only view of the forward map.
    pub fn iter(&self) -> impl Iterator<Item = (WatchHandle, &WatchEntry)> {
        self.forward.iter().map(|(&handle, entry)| (handle, entry))
    }
}
