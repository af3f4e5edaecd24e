// src/subsystem/codec.rs

//! Mapping from kernel inotify records onto [`Event`]s.

use std::ffi::{OsStr, OsString};

use ::inotify::EventMask;

use crate::subsystem::Event;
use crate::types::WatchHandle;

/// One kernel record, detached from the read buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub wd: i32,
    pub mask: EventMask,
    /// `None` for metadata-only records (no name, or an empty one).
    pub name: Option<OsString>,
}

impl RawEvent {
    pub fn new(wd: i32, mask: EventMask, name: Option<&str>) -> Self {
        Self {
            wd,
            mask,
            name: name.filter(|n| !n.is_empty()).map(OsString::from),
        }
    }

    pub fn from_kernel(event: &::inotify::Event<&OsStr>) -> Self {
        Self {
            wd: event.wd.get_watch_descriptor_id(),
            mask: event.mask,
            name: event
                .name
                .filter(|name| !name.is_empty())
                .map(OsStr::to_os_string),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.mask.contains(EventMask::ISDIR)
    }

    /// Map the record onto an [`Event`].
    ///
    /// Overflow and watch-removed records carry no name and are kept. Any
    /// other record without a name describes the watched directory itself
    /// and is skipped, as are masks other than create/delete.
    pub fn into_event(self) -> Option<Event> {
        if self.mask.contains(EventMask::Q_OVERFLOW) {
            return Some(Event::Overflow);
        }
        if self.mask.contains(EventMask::IGNORED) {
            return Some(Event::WatchRemoved {
                handle: WatchHandle(self.wd),
            });
        }

        let is_directory = self.is_directory();
        let parent = WatchHandle(self.wd);
        let name = self.name?;

        if self.mask.contains(EventMask::CREATE) {
            Some(Event::Create {
                parent,
                name,
                is_directory,
            })
        } else if self.mask.contains(EventMask::DELETE) {
            Some(Event::Delete {
                parent,
                name,
                is_directory,
            })
        } else {
            None
        }
    }
}

/// Translate a sequence of records, dropping those the reactor has no use
/// for. Order is preserved.
pub fn translate<I>(records: I) -> Vec<Event>
where
    I: IntoIterator<Item = RawEvent>,
{
    records.into_iter().filter_map(RawEvent::into_event).collect()
}
