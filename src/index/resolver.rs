// src/index/resolver.rs

//! Path reconstruction by walking parent links up to the root sentinel.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::errors::IndexError;
use crate::index::WatchEntry;
use crate::types::{ParentHandle, WatchHandle};

/// Rebuild the full path of `handle`.
///
/// `lookup` maps a live handle to its entry; `max_hops` is the number of live
/// entries. Parent links only ever point at entries that existed when the
/// child was inserted, so a well-formed chain is never longer than that. A
/// longer walk means a reused handle closed a loop, which is reported as
/// [`IndexError::BrokenChain`] instead of spinning.
///
/// The root entry's name is used verbatim as the first component, so a root
/// named `./tmp` yields paths like `./tmp/a/b`.
pub fn resolve_path<'a, F>(
    lookup: F,
    max_hops: usize,
    handle: WatchHandle,
) -> Result<PathBuf, IndexError>
where
    F: Fn(WatchHandle) -> Option<&'a WatchEntry>,
{
    let mut names = Vec::new();
    walk(&lookup, max_hops, handle, &mut names)?;
    Ok(names.into_iter().rev().collect())
}

/// Like [`resolve_path`], but keeps whatever part of the chain could be
/// walked.
///
/// For an entry whose ancestor is gone the result is relative to the missing
/// ancestor (`b/c` when `b`'s parent was erased). The error says why the
/// walk stopped; `None` means the path is complete.
pub fn resolve_partial<'a, F>(
    lookup: F,
    max_hops: usize,
    handle: WatchHandle,
) -> (PathBuf, Option<IndexError>)
where
    F: Fn(WatchHandle) -> Option<&'a WatchEntry>,
{
    let mut names = Vec::new();
    let stopped = walk(&lookup, max_hops, handle, &mut names).err();
    (names.into_iter().rev().collect(), stopped)
}

fn walk<'a, F>(
    lookup: &F,
    max_hops: usize,
    handle: WatchHandle,
    names: &mut Vec<&'a OsStr>,
) -> Result<(), IndexError>
where
    F: Fn(WatchHandle) -> Option<&'a WatchEntry>,
{
    let mut current = handle;

    loop {
        let entry = lookup(current).ok_or(IndexError::HandleNotFound(current))?;
        if names.len() >= max_hops {
            return Err(IndexError::BrokenChain(handle));
        }
        names.push(entry.name.as_os_str());

        match entry.parent {
            ParentHandle::Root => return Ok(()),
            ParentHandle::Watch(parent) => current = parent,
        }
    }
}
