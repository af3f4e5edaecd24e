// src/errors.rs

//! Crate-wide error types.
//!
//! - [`IndexError`]: failures of the watch index. All of them are expected
//!   on a lossy event stream and are absorbed by the reactor.
//! - [`SubsystemError`]: failures talking to the notification subsystem.
//! - [`TreewatchError`]: everything that can stop the process.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ParentHandle, WatchHandle};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("{name:?} under watch {parent} is already indexed as handle {existing}")]
    DuplicateEntry {
        parent: ParentHandle,
        name: OsString,
        existing: WatchHandle,
    },

    #[error("handle {0} is already indexed under another entry")]
    DuplicateHandle(WatchHandle),

    #[error("parent watch {0} is not indexed")]
    UnknownParent(WatchHandle),

    #[error("no entry for {name:?} under watch {parent}")]
    EntryNotFound { parent: ParentHandle, name: OsString },

    #[error("watch handle {0} is not indexed")]
    HandleNotFound(WatchHandle),

    #[error("parent chain of handle {0} does not reach the root")]
    BrokenChain(WatchHandle),
}

impl IndexError {
    /// True for the lookup failures (`EntryNotFound` / `HandleNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            IndexError::EntryNotFound { .. } | IndexError::HandleNotFound(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum SubsystemError {
    #[error("failed to initialise inotify: {0}")]
    Init(#[source] std::io::Error),

    #[error("failed to add watch for {path:?}: {source}")]
    AddWatch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove watch {handle}: {source}")]
    RemoveWatch {
        handle: WatchHandle,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read events: {0}")]
    Read(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TreewatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("cannot establish root watch on {path:?}: {source}")]
    RootWatch {
        path: PathBuf,
        #[source]
        source: SubsystemError,
    },
}

pub type Result<T> = std::result::Result<T, TreewatchError>;
