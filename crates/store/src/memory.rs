//! In-memory store for tests and examples.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use control_tower_api::{ManagedObject, ObjectKey};
use tokio::sync::RwLock;

use crate::client::Store;
use crate::error::{Result, StoreError};

/// In-memory [`Store`] implementation.
///
/// Version tokens are drawn from a monotonic counter; `update` enforces
/// token equality the way an optimistic-concurrency backend would. The
/// in-memory backend has no field-level diffing, so `patch` replaces the
/// stored object with the patched one wholesale.
#[derive(Debug, Default)]
pub struct InMemoryStore<O> {
    objects: RwLock<HashMap<ObjectKey, O>>,
    version_counter: AtomicU64,
}

impl<O> InMemoryStore<O> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            version_counter: AtomicU64::new(0),
        }
    }

    fn next_version(&self) -> String {
        let next = self.version_counter.fetch_add(1, Ordering::Relaxed) + 1;
        next.to_string()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl<O: ManagedObject + Clone + 'static> Store<O> for InMemoryStore<O> {
    async fn get(&self, key: &ObjectKey) -> Result<O> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key.clone()))
    }

    async fn create(&self, obj: &mut O) -> Result<()> {
        let key = obj.key();
        let mut objects = self.objects.write().await;
        if objects.contains_key(&key) {
            return Err(StoreError::already_exists(key));
        }
        obj.set_version(Some(self.next_version()));
        objects.insert(key, obj.clone());
        Ok(())
    }

    async fn update(&self, obj: &mut O) -> Result<()> {
        let key = obj.key();
        let mut objects = self.objects.write().await;
        match objects.get(&key) {
            None => return Err(StoreError::not_found(key)),
            Some(current) if current.version() != obj.version() => {
                return Err(StoreError::conflict(
                    key,
                    obj.version().unwrap_or("<unset>"),
                    current.version().unwrap_or("<unset>"),
                ));
            }
            Some(_) => {}
        }
        obj.set_version(Some(self.next_version()));
        objects.insert(key, obj.clone());
        Ok(())
    }

    async fn patch(&self, base: &O, patched: &mut O) -> Result<()> {
        let key = base.key();
        let mut objects = self.objects.write().await;
        if !objects.contains_key(&key) {
            return Err(StoreError::not_found(key));
        }
        patched.set_version(Some(self.next_version()));
        objects.insert(key, patched.clone());
        Ok(())
    }

    async fn update_status(&self, obj: &mut O) -> Result<()> {
        // Status writes go through a dedicated sub-resource endpoint and
        // bypass the version check.
        let key = obj.key();
        let mut objects = self.objects.write().await;
        if !objects.contains_key(&key) {
            return Err(StoreError::not_found(key));
        }
        obj.set_version(Some(self.next_version()));
        objects.insert(key, obj.clone());
        Ok(())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<()> {
        let mut objects = self.objects.write().await;
        match objects.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(key.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use control_tower_api::OwnerRef;

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Volume {
        name: String,
        namespace: String,
        size_gb: u64,
        finalizers: Vec<String>,
        version: Option<String>,
    }

    impl Volume {
        fn new(namespace: &str, name: &str, size_gb: u64) -> Self {
            Self {
                name: name.to_string(),
                namespace: namespace.to_string(),
                size_gb,
                ..Self::default()
            }
        }
    }

    impl ManagedObject for Volume {
        fn name(&self) -> &str {
            &self.name
        }
        fn namespace(&self) -> &str {
            &self.namespace
        }
        fn set_namespace(&mut self, namespace: &str) {
            self.namespace = namespace.to_string();
        }
        fn annotation(&self, _key: &str) -> Option<&str> {
            None
        }
        fn deletion_requested(&self) -> bool {
            false
        }
        fn finalizers(&self) -> &[String] {
            &self.finalizers
        }
        fn set_finalizers(&mut self, finalizers: Vec<String>) {
            self.finalizers = finalizers;
        }
        fn version(&self) -> Option<&str> {
            self.version.as_deref()
        }
        fn set_version(&mut self, version: Option<String>) {
            self.version = version;
        }
        fn set_owner(&mut self, _owner: OwnerRef) {}
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let store = InMemoryStore::new();
        let mut volume = Volume::new("prod", "data", 100);

        let created = store.create(&mut volume).await;
        assert!(created.is_ok());
        assert!(volume.version.is_some());

        let fetched = store.get(&ObjectKey::new("prod", "data")).await;
        assert_eq!(fetched.ok(), Some(volume));
    }

    #[tokio::test]
    async fn duplicate_create_is_already_exists() {
        let store = InMemoryStore::new();
        let mut volume = Volume::new("prod", "data", 100);
        let _ = store.create(&mut volume).await;

        let mut duplicate = Volume::new("prod", "data", 200);
        let err = store.create(&mut duplicate).await.err();
        assert!(err.is_some_and(|e| e.is_already_exists()));
    }

    #[tokio::test]
    async fn update_with_stale_token_conflicts() {
        let store = InMemoryStore::new();
        let mut volume = Volume::new("prod", "data", 100);
        let _ = store.create(&mut volume).await;

        let mut stale = volume.clone();
        stale.version = Some("0".to_string());
        let err = store.update(&mut stale).await.err();
        assert!(matches!(err, Some(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn update_bumps_the_version_token() {
        let store = InMemoryStore::new();
        let mut volume = Volume::new("prod", "data", 100);
        let _ = store.create(&mut volume).await;
        let created_version = volume.version.clone();

        volume.size_gb = 200;
        let updated = store.update(&mut volume).await;
        assert!(updated.is_ok());
        assert_ne!(volume.version, created_version);
    }

    #[tokio::test]
    async fn delete_distinguishes_not_found() {
        let store = InMemoryStore::new();
        let mut volume = Volume::new("prod", "data", 100);
        let _ = store.create(&mut volume).await;

        assert!(store.delete(&ObjectKey::new("prod", "data")).await.is_ok());
        let err = store.delete(&ObjectKey::new("prod", "data")).await.err();
        assert!(err.is_some_and(|e| e.is_not_found()));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn get_of_missing_key_is_not_found() {
        let store: InMemoryStore<Volume> = InMemoryStore::new();
        let err = store.get(&ObjectKey::new("prod", "missing")).await.err();
        assert!(err.is_some_and(|e| e.is_not_found()));
    }
}
