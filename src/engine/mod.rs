// src/engine/mod.rs

//! Event processing engine.
//!
//! - [`reactor`]: the pure per-event state machine. Owns the [`WatchIndex`]
//!   and talks to the kernel only through [`WatchRegistry`].
//! - [`lifecycle`]: installing the root watch and releasing everything at
//!   shutdown.
//! - [`runtime`]: the async shell that waits for batches, feeds them through
//!   the reactor and forwards reports, until cancelled.
//!
//! [`WatchIndex`]: crate::index::WatchIndex
//! [`WatchRegistry`]: crate::subsystem::WatchRegistry

pub mod lifecycle;
pub mod reactor;
pub mod runtime;

pub use lifecycle::{bootstrap, teardown};
pub use reactor::EventReactor;
pub use runtime::Runtime;
