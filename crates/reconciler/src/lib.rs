//! Drift-correcting reconciliation core.
//!
//! This crate implements the control-loop logic for managers that
//! continuously converge observed objects toward desired specifications:
//!
//! - **Upgrade**: match an ordered spec list against an ordered resource
//!   list and apply the minimal create/update/delete set
//! - **Finalizer**: guarantee a cleanup routine has run before an object
//!   becomes eligible for physical removal
//! - **Classified errors**: a closed set of failure classes with a
//!   requeue policy for each
//! - **Reconciler**: idempotent upsert/delete helpers with owner-reference
//!   propagation and status management
//!
//! The core is synchronous per invocation: an external trigger delivers
//! one object key at a time (at-least-once, serialized per key) and
//! consumes the returned [`Requeue`] directive. Safety under redelivery
//! comes from idempotence, not locking.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use control_tower_api::SystemClock;
//! use control_tower_reconciler::Reconciler;
//! use control_tower_store::{InMemoryStore, LogNotifier};
//!
//! # async fn run() {
//! let store = Arc::new(InMemoryStore::new());
//! let reconciler = Reconciler::new(
//!     "database-controller",
//!     store,
//!     Arc::new(LogNotifier),
//!     Arc::new(SystemClock),
//! );
//!
//! let mut desired = load_desired_object();
//! match reconciler.create_or_replace(None, &mut desired).await {
//!     Ok(()) => { /* reconciler.manage_success(&mut desired).await */ }
//!     Err(err) => { /* reconciler.manage_error(&mut desired, err).await */ }
//! }
//! # }
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod error;
pub mod finalizer;
pub mod reconciler;
pub mod types;
pub mod upgrade;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types
pub use error::{BoxError, ReconcileError, Result};
pub use finalizer::{
    add_finalizer, has_finalizer, is_being_deleted, remove_finalizer, FinalizeOutcome, Finalizer,
    FinalizerState,
};
pub use reconciler::{Reconciler, DO_NOT_RECONCILE_ANNOTATION};
pub use types::Requeue;
pub use upgrade::{upgrade, UpgradeStrategy};
