// src/types.rs

//! Small value types shared across the index, the reactor and the
//! notification subsystem.

use std::fmt;

/// Opaque identifier the notification subsystem hands out for one watched
/// directory.
///
/// Unique only while the watch is active: the kernel may hand the same value
/// out again once the watch has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(pub i32);

impl WatchHandle {
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for WatchHandle {
    fn from(raw: i32) -> Self {
        WatchHandle(raw)
    }
}

/// Parent link of a watched directory.
///
/// `Root` is the sentinel for the top of the watched subtree. Because it is
/// its own variant, no real handle can ever collide with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentHandle {
    Root,
    Watch(WatchHandle),
}

impl From<WatchHandle> for ParentHandle {
    fn from(handle: WatchHandle) -> Self {
        ParentHandle::Watch(handle)
    }
}

impl fmt::Display for ParentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentHandle::Root => f.write_str("root"),
            ParentHandle::Watch(handle) => write!(f, "{handle}"),
        }
    }
}
