//! Store client and notifier contracts for control-tower.
//!
//! The reconciliation toolkit talks to the outside world through two
//! collaborators defined here:
//!
//! - **Store**: key-addressed CRUD over managed objects with a
//!   distinguishable not-found outcome and optimistic-concurrency updates
//! - **Notifier**: fire-and-forget events attached to managed objects
//!
//! Both ship with reference implementations: [`InMemoryStore`] backs tests
//! and examples, [`LogNotifier`] routes events through `tracing`, and
//! [`RecordingNotifier`] captures them for assertions.

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod client;
pub mod error;
pub mod memory;
pub mod notify;

// Re-export main types
pub use client::Store;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier, Severity};
