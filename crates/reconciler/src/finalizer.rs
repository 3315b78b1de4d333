//! Finalizer lifecycle state machine.
//!
//! A finalizer marker on an object blocks physical deletion until the
//! cleanup routine has completed once. The state machine guarantees
//! at-least-once cleanup attempts and at-most-once marker removal; the
//! cleanup routine itself is caller-owned and must be idempotent since it
//! may run on every retry.

use std::future::Future;
use std::sync::Arc;

use control_tower_api::ManagedObject;
use control_tower_store::Store;
use tracing::{debug, warn};

use crate::error::Result;

/// Whether deletion of `obj` has been requested.
pub fn is_being_deleted(obj: &dyn ManagedObject) -> bool {
    obj.deletion_requested()
}

/// Whether `obj` carries the given finalizer marker.
pub fn has_finalizer(obj: &dyn ManagedObject, finalizer: &str) -> bool {
    obj.finalizers().iter().any(|f| f == finalizer)
}

/// Add a finalizer marker to `obj`. No-op when already present.
pub fn add_finalizer(obj: &mut dyn ManagedObject, finalizer: &str) {
    if !has_finalizer(obj, finalizer) {
        let mut finalizers = obj.finalizers().to_vec();
        finalizers.push(finalizer.to_string());
        obj.set_finalizers(finalizers);
    }
}

/// Remove a finalizer marker from `obj`.
pub fn remove_finalizer(obj: &mut dyn ManagedObject, finalizer: &str) {
    let mut finalizers = obj.finalizers().to_vec();
    finalizers.retain(|f| f != finalizer);
    obj.set_finalizers(finalizers);
}

/// Lifecycle position of an object with respect to one finalizer marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerState {
    /// No deletion request, marker absent.
    Unmanaged,
    /// No deletion request, marker present.
    Active,
    /// Deletion requested, marker present; cleanup still owed.
    PendingDeletion,
    /// Deletion requested, marker absent. Terminal: the object is eligible
    /// for physical removal by the store.
    Finalized,
}

impl FinalizerState {
    /// Classify `obj` against the given marker.
    pub fn of(obj: &dyn ManagedObject, finalizer: &str) -> Self {
        match (obj.deletion_requested(), has_finalizer(obj, finalizer)) {
            (false, false) => Self::Unmanaged,
            (false, true) => Self::Active,
            (true, true) => Self::PendingDeletion,
            (true, false) => Self::Finalized,
        }
    }
}

/// Outcome of driving the state machine one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// A missing marker was added and persisted.
    pub initialized: bool,
    /// Deletion was requested and cleanup is complete; the object may be
    /// physically removed.
    pub finalized: bool,
}

/// Drives finalization of managed objects against a backing store.
pub struct Finalizer<O: ManagedObject> {
    name: String,
    store: Arc<dyn Store<O>>,
}

impl<O: ManagedObject> Finalizer<O> {
    /// Create a finalizer using `name` as its marker string.
    pub fn new(name: impl Into<String>, store: Arc<dyn Store<O>>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// The marker string this finalizer maintains.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify `obj` without touching the store.
    pub fn state(&self, obj: &O) -> FinalizerState {
        FinalizerState::of(obj, &self.name)
    }

    /// Run one step of the finalization state machine.
    ///
    /// With deletion requested and the marker present, `clean` runs first.
    /// A cleanup failure is returned with the marker intact, so the next
    /// delivery retries; on success the marker is removed and persisted
    /// exactly once. A marker is never re-added once a deletion request
    /// has been observed, and a finalized object triggers no store writes
    /// on redelivery.
    pub async fn finalize<C, Fut>(&self, obj: &mut O, clean: C) -> Result<FinalizeOutcome>
    where
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>> + Send,
    {
        let marked_for_deletion = obj.deletion_requested();
        let contains_finalizer = has_finalizer(obj, &self.name);

        if marked_for_deletion {
            if contains_finalizer {
                if let Err(err) = clean().await {
                    warn!(object = %obj.key(), error = %err, "Cleanup failed, keeping finalizer");
                    return Err(err);
                }
                debug!(object = %obj.key(), finalizer = %self.name, "Removing finalizer");
                remove_finalizer(obj, &self.name);
                self.store.update(obj).await?;
            }
            return Ok(FinalizeOutcome {
                initialized: false,
                finalized: true,
            });
        }

        if !contains_finalizer {
            debug!(object = %obj.key(), finalizer = %self.name, "Adding finalizer");
            add_finalizer(obj, &self.name);
            self.store.update(obj).await?;
            return Ok(FinalizeOutcome {
                initialized: true,
                finalized: false,
            });
        }

        Ok(FinalizeOutcome::default())
    }
}
