//! Reconciliation orchestrator.
//!
//! Composes the store client, notifier, clock and finalizer machinery into
//! the helpers a drift-correcting manager needs: idempotent upserts with
//! owner-reference propagation, and the error/success policies that turn
//! outcomes into status mutations and requeue directives.

use std::future::Future;
use std::sync::Arc;

use control_tower_api::{Clock, Condition, ConditionStatus, ManagedObject, OwnerRef, ReadyStatus};
use control_tower_store::{Notifier, Severity, Store};
use tracing::{debug, error, info, warn};

use crate::error::{ReconcileError, Result};
use crate::finalizer::Finalizer;
use crate::types::Requeue;

/// Annotation that suppresses mutation of an already-existing object
/// during create-or-replace and create-or-patch. The value must be exactly
/// `"true"`.
pub const DO_NOT_RECONCILE_ANNOTATION: &str = "control-tower/do-not-reconcile";

fn reconcile_suppressed(obj: &dyn ManagedObject) -> bool {
    obj.annotation(DO_NOT_RECONCILE_ANNOTATION) == Some("true")
}

/// Orchestrates reconciliation of one managed object type.
///
/// Every operation is idempotent and safe under at-least-once delivery:
/// interrupting a partially applied batch and re-running it from scratch
/// converges without corruption. The orchestrator holds no state across
/// invocations and performs no locking.
pub struct Reconciler<O: ManagedObject> {
    store: Arc<dyn Store<O>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    finalizer: Finalizer<O>,
}

impl<O: ManagedObject + Clone + 'static> Reconciler<O> {
    /// Create a reconciler. `name` identifies the controller and doubles
    /// as its finalizer marker.
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn Store<O>>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            finalizer: Finalizer::new(name, store.clone()),
            store,
            notifier,
            clock,
        }
    }

    /// The backing store client.
    pub fn store(&self) -> &Arc<dyn Store<O>> {
        &self.store
    }

    /// The notification sink.
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// The finalizer state machine bound to this controller's marker.
    pub fn finalizer(&self) -> &Finalizer<O> {
        &self.finalizer
    }

    fn claim(owner: Option<&dyn ManagedObject>, obj: &mut O) {
        if let Some(owner) = owner {
            obj.set_owner(OwnerRef::of(owner));
            if obj.namespace().is_empty() {
                obj.set_namespace(owner.namespace());
            }
        }
    }

    /// Create `obj` unless it already exists; an existing object is left
    /// untouched. Sets the owner back-reference and defaults the namespace
    /// from `owner` when unset.
    pub async fn create_if_absent(
        &self,
        owner: Option<&dyn ManagedObject>,
        obj: &mut O,
    ) -> Result<()> {
        Self::claim(owner, obj);
        debug!(object = %obj.key(), "Creating resource if missing");
        match self.store.create(obj).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_already_exists() => {
                debug!(object = %obj.key(), "Resource already exists");
                Ok(())
            }
            Err(err) => {
                error!(object = %obj.key(), error = %err, "Unable to create object");
                Err(err.into())
            }
        }
    }

    /// Create `obj` if absent, otherwise overwrite the stored object with
    /// it, carrying the stored version token forward.
    ///
    /// An existing object annotated with
    /// [`DO_NOT_RECONCILE_ANNOTATION`] `= "true"` is left untouched.
    pub async fn create_or_replace(
        &self,
        owner: Option<&dyn ManagedObject>,
        obj: &mut O,
    ) -> Result<()> {
        Self::claim(owner, obj);
        let key = obj.key();
        match self.store.get(&key).await {
            Err(err) if err.is_not_found() => {
                debug!(object = %key, "Creating resource");
                if let Err(err) = self.store.create(obj).await {
                    error!(object = %key, error = %err, "Unable to create object");
                    return Err(err.into());
                }
                Ok(())
            }
            Ok(found) => {
                if reconcile_suppressed(obj) {
                    debug!(object = %key, "Reconciliation suppressed by annotation");
                    return Ok(());
                }
                obj.set_version(found.version().map(str::to_string));
                debug!(object = %key, "Updating resource");
                if let Err(err) = self.store.update(obj).await {
                    error!(object = %key, error = %err, "Unable to update object");
                    return Err(err.into());
                }
                Ok(())
            }
            Err(err) => {
                error!(object = %key, error = %err, "Unable to look up object");
                Err(err.into())
            }
        }
    }

    /// Create `obj` if absent, otherwise apply `merge` to the fetched
    /// object and persist only that difference as a patch against the
    /// fetched snapshot.
    ///
    /// `merge` receives the fetched object first and the desired object
    /// second, and mutates only the fields it owns; fields it does not
    /// touch cannot conflict with concurrent writers. Suppression works as
    /// in [`Reconciler::create_or_replace`].
    pub async fn create_or_patch<F>(
        &self,
        owner: Option<&dyn ManagedObject>,
        obj: &mut O,
        merge: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut O, &O) -> Result<()>,
    {
        Self::claim(owner, obj);
        let key = obj.key();
        match self.store.get(&key).await {
            Err(err) if err.is_not_found() => {
                debug!(object = %key, "Creating resource");
                if let Err(err) = self.store.create(obj).await {
                    error!(object = %key, error = %err, "Unable to create object");
                    return Err(err.into());
                }
                Ok(())
            }
            Ok(mut found) => {
                if reconcile_suppressed(obj) {
                    debug!(object = %key, "Reconciliation suppressed by annotation");
                    return Ok(());
                }
                let base = found.clone();
                if let Err(err) = merge(&mut found, obj) {
                    error!(object = %key, error = %err, "Failed to modify object");
                    return Err(err);
                }
                debug!(object = %key, "Patching resource");
                if let Err(err) = self.store.patch(&base, &mut found).await {
                    error!(object = %key, error = %err, "Unable to patch object");
                    return Err(err.into());
                }
                Ok(())
            }
            Err(err) => {
                error!(object = %key, error = %err, "Unable to look up object");
                Err(err.into())
            }
        }
    }

    /// Delete `obj` from the store; a missing object counts as success.
    pub async fn delete_if_exists(&self, obj: &O) -> Result<()> {
        let key = obj.key();
        debug!(object = %key, "Removing resource");
        match self.store.delete(&key).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => {
                error!(object = %key, error = %err, "Unable to delete object");
                Err(err.into())
            }
        }
    }

    /// Apply [`Reconciler::create_if_absent`] across `objs` in order,
    /// aborting on the first error.
    pub async fn create_all_if_absent(
        &self,
        owner: Option<&dyn ManagedObject>,
        objs: &mut [O],
    ) -> Result<()> {
        for obj in objs.iter_mut() {
            self.create_if_absent(owner, obj).await?;
        }
        Ok(())
    }

    /// Apply [`Reconciler::create_or_replace`] across `objs` in order,
    /// aborting on the first error.
    pub async fn create_or_replace_all(
        &self,
        owner: Option<&dyn ManagedObject>,
        objs: &mut [O],
    ) -> Result<()> {
        for obj in objs.iter_mut() {
            self.create_or_replace(owner, obj).await?;
        }
        Ok(())
    }

    /// Apply [`Reconciler::delete_if_exists`] across `objs` in order,
    /// aborting on the first error.
    pub async fn delete_all_if_exist(&self, objs: &[O]) -> Result<()> {
        for obj in objs {
            self.delete_if_exists(obj).await?;
        }
        Ok(())
    }

    /// Ensure the finalizer marker is managed for `obj`, running `clean`
    /// when deletion has been requested.
    ///
    /// Returns `true` exactly when the object is active (marker in place,
    /// no deletion requested) and reconciliation of desired state may
    /// proceed.
    pub async fn is_finalized<C, Fut>(&self, obj: &mut O, clean: C) -> Result<bool>
    where
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>> + Send,
    {
        let outcome = self.finalizer.finalize(obj, clean).await?;
        Ok(!outcome.initialized && !outcome.finalized)
    }

    /// Record a failed reconciliation on `obj` and decide the requeue.
    ///
    /// In order: emit a warning event; upsert the carried condition when
    /// the object exposes a condition list; set a failed readiness status
    /// when the object exposes one; persist the status sub-resource when
    /// anything changed (a failed status write collapses to a short fixed
    /// requeue, never a second classification round); then classify the
    /// unwrapped error into its requeue policy. An unclassified error is
    /// returned to the caller so the trigger's own backoff governs timing.
    pub async fn manage_error(&self, obj: &mut O, err: ReconcileError) -> Result<Requeue> {
        let key = obj.key();
        self.notifier
            .emit(&key, Severity::Warning, "ProcessingError", &err.to_string());

        let now = self.clock.now();
        let mut status_changed = false;

        let err = match err {
            ReconcileError::Condition {
                condition_type,
                reason,
                source,
            } => {
                if let Some(conditions) = obj.as_conditions() {
                    debug!(object = %key, condition_type = %condition_type, "Setting status condition");
                    status_changed = conditions.set_condition(Condition {
                        condition_type,
                        status: ConditionStatus::False,
                        reason,
                        message: source.to_string(),
                        last_update: now,
                    });
                }
                // Continue classification with the wrapped error.
                *source
            }
            other => other,
        };

        if let Some(ready) = obj.as_ready_status() {
            debug!(object = %key, "Setting readiness status to failed");
            ready.set_ready_status(ReadyStatus::failed(err.to_string(), now));
            status_changed = true;
        }

        if status_changed {
            if let Err(status_err) = self.store.update_status(obj).await {
                warn!(object = %key, error = %status_err, "Unable to update status");
                return Ok(Requeue::After(Requeue::STATUS_WRITE_RETRY));
            }
        }

        match err {
            ReconcileError::NotRetriable { source } => {
                error!(object = %key, error = %source, "Not retriable error");
                Ok(Requeue::After(Requeue::NOT_RETRIABLE_RETRY))
            }
            ReconcileError::Retriable {
                retry_after,
                source,
            } => {
                info!(
                    object = %key,
                    error = %source,
                    retry_after_secs = retry_after.as_secs(),
                    "Retriable error, requeueing"
                );
                Ok(Requeue::After(retry_after))
            }
            other => Err(other),
        }
    }

    /// Record a successful reconciliation on `obj`.
    ///
    /// Sets and persists an ok readiness status when the object exposes
    /// one; a failed status write collapses to the same short fixed
    /// requeue as in [`Reconciler::manage_error`].
    pub async fn manage_success(&self, obj: &mut O) -> Result<Requeue> {
        let now = self.clock.now();
        match obj.as_ready_status() {
            Some(ready) => ready.set_ready_status(ReadyStatus::ok(now)),
            None => return Ok(Requeue::None),
        }
        if let Err(err) = self.store.update_status(obj).await {
            warn!(object = %obj.key(), error = %err, "Unable to update status");
            return Ok(Requeue::After(Requeue::STATUS_WRITE_RETRY));
        }
        Ok(Requeue::None)
    }
}
