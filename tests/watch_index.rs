use std::ffi::OsStr;
use std::path::PathBuf;

use treewatch::errors::IndexError;
use treewatch::index::WatchIndex;
use treewatch::types::{ParentHandle, WatchHandle};

const ROOT: ParentHandle = ParentHandle::Root;

fn h(raw: i32) -> WatchHandle {
    WatchHandle(raw)
}

fn under(raw: i32) -> ParentHandle {
    ParentHandle::Watch(WatchHandle(raw))
}

fn assert_consistent(index: &WatchIndex) {
    let (fwd, rev) = index.count();
    assert_eq!(fwd, rev, "forward and reverse views diverged");
    for (handle, entry) in index.iter() {
        assert_eq!(index.lookup(entry.parent, &entry.name), Some(handle));
    }
}

/// root "a" -> "b" -> "c", handles 1, 2, 3.
fn chain() -> WatchIndex {
    let mut index = WatchIndex::new();
    index.insert(ROOT, "a", h(1)).unwrap();
    assert_consistent(&index);
    index.insert(under(1), "b", h(2)).unwrap();
    assert_consistent(&index);
    index.insert(under(2), "c", h(3)).unwrap();
    assert_consistent(&index);
    index
}

#[test]
fn resolves_full_path_through_parent_chain() {
    let index = chain();

    assert_eq!(index.resolve(h(3)).unwrap(), PathBuf::from("a/b/c"));
    assert_eq!(index.resolve(h(2)).unwrap(), PathBuf::from("a/b"));
    assert_eq!(index.resolve(h(1)).unwrap(), PathBuf::from("a"));
}

#[test]
fn root_name_is_used_verbatim() {
    let mut index = WatchIndex::new();
    index.insert(ROOT, "./tmp", h(1)).unwrap();
    index.insert(under(1), "a", h(2)).unwrap();

    assert_eq!(index.resolve(h(2)).unwrap(), PathBuf::from("./tmp/a"));
}

#[test]
fn insert_then_erase_round_trips() {
    let mut index = chain();
    index.insert(under(3), "d", h(4)).unwrap();
    let before = index.resolve(h(4)).unwrap();

    let (path, handle) = index.erase(under(3), OsStr::new("d")).unwrap();

    assert_eq!(handle, h(4));
    assert_eq!(path, before);
    assert_eq!(index.resolve(h(4)), Err(IndexError::HandleNotFound(h(4))));
    assert_eq!(index.count(), (3, 3));
    assert_consistent(&index);
}

#[test]
fn duplicate_key_is_rejected_and_index_unchanged() {
    let mut index = chain();

    let err = index.insert(under(1), "b", h(9)).unwrap_err();

    assert_eq!(
        err,
        IndexError::DuplicateEntry {
            parent: under(1),
            name: "b".into(),
            existing: h(2),
        }
    );
    assert_eq!(index.count(), (3, 3));
    assert!(!index.contains(h(9)));
    assert_eq!(index.lookup(under(1), OsStr::new("b")), Some(h(2)));
    assert_consistent(&index);
}

#[test]
fn handle_already_indexed_is_rejected() {
    let mut index = chain();

    let err = index.insert(under(1), "other", h(3)).unwrap_err();

    assert_eq!(err, IndexError::DuplicateHandle(h(3)));
    assert_eq!(index.lookup(under(1), OsStr::new("other")), None);
    assert_eq!(index.resolve(h(3)).unwrap(), PathBuf::from("a/b/c"));
    assert_consistent(&index);
}

#[test]
fn insert_requires_known_parent() {
    let mut index = chain();

    let err = index.insert(under(42), "x", h(5)).unwrap_err();

    assert_eq!(err, IndexError::UnknownParent(h(42)));
    assert_eq!(index.count(), (3, 3));
}

#[test]
fn erase_of_unknown_key_is_not_found_and_no_op() {
    let mut index = chain();

    let err = index.erase(under(1), OsStr::new("nope")).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err,
        IndexError::EntryNotFound {
            parent: under(1),
            name: "nope".into(),
        }
    );
    assert_eq!(index.count(), (3, 3));
    assert_consistent(&index);
}

#[test]
fn resolve_of_unknown_handle_is_not_found() {
    let index = WatchIndex::new();

    let err = index.resolve(h(7)).unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn orphaned_entry_fails_to_resolve() {
    let mut index = chain();
    // Lost delete events for "c": its parent goes away first.
    index.erase(under(1), OsStr::new("b")).unwrap();

    assert_eq!(index.resolve(h(3)), Err(IndexError::HandleNotFound(h(2))));
    assert_consistent(&index);
}

#[test]
fn orphaned_entry_is_still_erased() {
    let mut index = chain();
    index.erase(under(1), OsStr::new("b")).unwrap();

    let (path, handle) = index.erase(under(2), OsStr::new("c")).unwrap();

    assert_eq!(handle, h(3));
    // Relative to the erased parent.
    assert_eq!(path, PathBuf::from("c"));
    assert!(!index.contains(h(3)));
    assert_eq!(index.lookup(under(2), OsStr::new("c")), None);
    assert_eq!(index.count(), (1, 1));
    assert_consistent(&index);
}

#[test]
fn erased_orphan_frees_its_handle_for_reuse() {
    let mut index = chain();
    index.erase(under(1), OsStr::new("b")).unwrap();
    index.erase(under(2), OsStr::new("c")).unwrap();

    index.insert(under(1), "new", h(3)).unwrap();

    assert_eq!(index.resolve(h(3)).unwrap(), PathBuf::from("a/new"));
    assert_consistent(&index);
}

#[test]
fn reused_handle_forming_a_loop_is_reported_not_followed() {
    let mut index = chain();
    index.erase(ParentHandle::Root, OsStr::new("a")).unwrap();
    // Handle 1 comes back for a directory inside the orphaned "c".
    index.insert(under(3), "x", h(1)).unwrap();

    assert_eq!(index.resolve(h(3)), Err(IndexError::BrokenChain(h(3))));
    assert_eq!(index.resolve(h(1)), Err(IndexError::BrokenChain(h(1))));
    assert_consistent(&index);
}

#[test]
fn same_name_under_different_parents_are_distinct() {
    let mut index = WatchIndex::new();
    index.insert(ROOT, "root", h(1)).unwrap();
    index.insert(under(1), "a", h(2)).unwrap();
    index.insert(under(2), "a", h(3)).unwrap();

    assert_eq!(index.resolve(h(3)).unwrap(), PathBuf::from("root/a/a"));
    assert_eq!(index.lookup(under(1), OsStr::new("a")), Some(h(2)));
    assert_eq!(index.lookup(under(2), OsStr::new("a")), Some(h(3)));
}

#[test]
fn drain_returns_every_handle_and_empties() {
    let mut index = chain();

    let drained = index.drain();

    assert_eq!(drained, vec![h(1), h(2), h(3)]);
    assert!(index.is_empty());
    assert_eq!(index.count(), (0, 0));
}

#[test]
fn erased_handle_can_be_reused() {
    let mut index = chain();
    index.erase(under(2), OsStr::new("c")).unwrap();

    index.insert(under(1), "fresh", h(3)).unwrap();

    assert_eq!(index.resolve(h(3)).unwrap(), PathBuf::from("a/fresh"));
    assert_consistent(&index);
}
