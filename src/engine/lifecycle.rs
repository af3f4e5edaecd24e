// src/engine/lifecycle.rs

//! Session start and end: the root watch, and releasing every watch that is
//! still outstanding.

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{Result, TreewatchError};
use crate::index::WatchIndex;
use crate::report::TeardownSummary;
use crate::subsystem::WatchRegistry;
use crate::types::{ParentHandle, WatchHandle};

/// Watch `root` and record it as the top of the subtree.
///
/// The root entry's name is `root` exactly as given, so reported paths are
/// relative to wherever `root` is. Failure is fatal: without the root watch
/// there is nothing to monitor.
pub fn bootstrap<R>(index: &mut WatchIndex, registry: &mut R, root: &Path) -> Result<WatchHandle>
where
    R: WatchRegistry + ?Sized,
{
    let handle = registry
        .add_watch(root)
        .map_err(|source| TreewatchError::RootWatch {
            path: root.to_path_buf(),
            source,
        })?;

    if let Err(err) = index.insert(ParentHandle::Root, root.as_os_str(), handle) {
        if !index.contains(handle) {
            if let Err(rm_err) = registry.remove_watch(handle) {
                debug!(%handle, error = %rm_err, "could not release unindexed root watch");
            }
        }
        return Err(err.into());
    }

    info!(%handle, ?root, "root watch established");
    Ok(handle)
}

/// Drain the index and release every handle it held.
///
/// Handles the kernel already dropped (deleted directories, reused
/// descriptors) fail to release; they are counted, never fatal.
pub fn teardown<R>(index: &mut WatchIndex, registry: &mut R) -> TeardownSummary
where
    R: WatchRegistry + ?Sized,
{
    let mut summary = TeardownSummary::default();

    for handle in index.drain() {
        match registry.remove_watch(handle) {
            Ok(()) => summary.released += 1,
            Err(err) => {
                debug!(%handle, error = %err, "watch already released");
                summary.failed += 1;
            }
        }
    }

    info!(
        released = summary.released,
        failed = summary.failed,
        "released outstanding watches"
    );
    summary
}
