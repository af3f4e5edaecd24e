#![allow(dead_code)]

use std::ffi::OsString;

use treewatch::subsystem::Event;
use treewatch::types::WatchHandle;

pub fn dir_created(parent: WatchHandle, name: &str) -> Event {
    Event::Create {
        parent,
        name: OsString::from(name),
        is_directory: true,
    }
}

pub fn file_created(parent: WatchHandle, name: &str) -> Event {
    Event::Create {
        parent,
        name: OsString::from(name),
        is_directory: false,
    }
}

pub fn dir_deleted(parent: WatchHandle, name: &str) -> Event {
    Event::Delete {
        parent,
        name: OsString::from(name),
        is_directory: true,
    }
}

pub fn file_deleted(parent: WatchHandle, name: &str) -> Event {
    Event::Delete {
        parent,
        name: OsString::from(name),
        is_directory: false,
    }
}
