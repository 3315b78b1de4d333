//! Shared object model for control-tower managed objects.
//!
//! This crate defines the contracts between a drift-correcting manager and
//! the objects it manages:
//!
//! - **Object model**: [`ObjectKey`] addressing, [`OwnerRef`] back-references
//!   and the [`ManagedObject`] trait every managed type satisfies
//! - **Status vocabulary**: [`Condition`] facts and the [`ReadyStatus`]
//!   readiness summary recorded on an object's status
//! - **Capabilities**: optional status surfaces ([`ReadyStatusAware`],
//!   [`ConditionsAware`]) an object may or may not expose
//! - **Clock**: an injectable time source so status timestamps stay
//!   deterministic under test
//!
//! # Example
//!
//! ```ignore
//! use control_tower_api::{Clock, ReadyStatus, SystemClock};
//!
//! let clock = SystemClock;
//! let status = ReadyStatus::ok(clock.now());
//! assert!(status.ready);
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod clock;
pub mod object;
pub mod status;

// Re-export main types
pub use clock::{Clock, FixedClock, SystemClock};
pub use object::{ConditionsAware, ManagedObject, ObjectKey, OwnerRef, ReadyStatusAware};
pub use status::{
    upsert_condition, Condition, ConditionReason, ConditionStatus, ConditionType, ReadyStatus,
};
