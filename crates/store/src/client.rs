//! Store client contract.

use async_trait::async_trait;
use control_tower_api::{ManagedObject, ObjectKey};

use crate::error::Result;

/// Key-addressed CRUD over managed objects of one type.
///
/// Implementations must be safe for concurrent use by the external trigger
/// mechanism; the toolkit performs no locking of its own and relies on
/// idempotent retries. Version-token mismatches surface as
/// [`StoreError::Conflict`](crate::StoreError::Conflict) and are resolved
/// by requeue-and-retry, never locally.
///
/// Mutating calls take `&mut` so the store can stamp the newly assigned
/// version token back onto the caller's copy.
#[async_trait]
pub trait Store<O: ManagedObject>: Send + Sync {
    /// Fetch the object stored under `key`. Absence is the distinguishable
    /// not-found outcome.
    async fn get(&self, key: &ObjectKey) -> Result<O>;

    /// Create `obj`. Fails with already-exists when the key is taken.
    async fn create(&self, obj: &mut O) -> Result<()>;

    /// Overwrite the stored object. The expected version is the token
    /// carried by `obj`; a mismatch fails with a conflict.
    async fn update(&self, obj: &mut O) -> Result<()>;

    /// Persist the difference between `base` and `patched` without
    /// overwriting fields outside that difference.
    async fn patch(&self, base: &O, patched: &mut O) -> Result<()>;

    /// Persist only the status sub-resource of `obj`.
    async fn update_status(&self, obj: &mut O) -> Result<()>;

    /// Delete the object under `key`. Absence is the distinguishable
    /// not-found outcome.
    async fn delete(&self, key: &ObjectKey) -> Result<()>;
}
