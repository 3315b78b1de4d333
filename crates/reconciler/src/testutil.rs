//! Fixtures shared by the crate's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use control_tower_api::{
    upsert_condition, Condition, ConditionsAware, ManagedObject, ObjectKey, OwnerRef, ReadyStatus,
    ReadyStatusAware,
};
use control_tower_store::{InMemoryStore, Store, StoreError};

/// Managed object with both status capabilities and a payload field for
/// replace/patch assertions.
#[derive(Debug, Clone, Default)]
pub struct TestObject {
    pub name: String,
    pub namespace: String,
    pub annotations: HashMap<String, String>,
    pub deletion_requested: bool,
    pub finalizers: Vec<String>,
    pub version: Option<String>,
    pub owner: Option<OwnerRef>,
    pub ready: Option<ReadyStatus>,
    pub conditions: Vec<Condition>,
    pub payload: String,
}

impl TestObject {
    pub fn named(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Self::default()
        }
    }

    pub fn with_payload(mut self, payload: &str) -> Self {
        self.payload = payload.to_string();
        self
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }
}

impl ManagedObject for TestObject {
    fn name(&self) -> &str {
        &self.name
    }
    fn namespace(&self) -> &str {
        &self.namespace
    }
    fn set_namespace(&mut self, namespace: &str) {
        self.namespace = namespace.to_string();
    }
    fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
    fn deletion_requested(&self) -> bool {
        self.deletion_requested
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
    fn set_owner(&mut self, owner: OwnerRef) {
        self.owner = Some(owner);
    }
    fn as_ready_status(&mut self) -> Option<&mut dyn ReadyStatusAware> {
        Some(self)
    }
    fn as_conditions(&mut self) -> Option<&mut dyn ConditionsAware> {
        Some(self)
    }
}

impl ReadyStatusAware for TestObject {
    fn ready_status(&self) -> Option<&ReadyStatus> {
        self.ready.as_ref()
    }
    fn set_ready_status(&mut self, status: ReadyStatus) {
        self.ready = Some(status);
    }
}

impl ConditionsAware for TestObject {
    fn set_condition(&mut self, condition: Condition) -> bool {
        upsert_condition(&mut self.conditions, condition)
    }
}

/// Managed object without any status capability.
#[derive(Debug, Clone, Default)]
pub struct BareObject {
    pub name: String,
    pub namespace: String,
    pub finalizers: Vec<String>,
    pub version: Option<String>,
}

impl BareObject {
    pub fn named(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Self::default()
        }
    }
}

impl ManagedObject for BareObject {
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

/// Store wrapper that injects failures into status writes.
pub struct FailingStatusStore<O> {
    inner: InMemoryStore<O>,
    fail_status_writes: AtomicBool,
}

impl<O> FailingStatusStore<O> {
    /// Create a wrapper around a fresh in-memory store, wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryStore::new(),
            fail_status_writes: AtomicBool::new(false),
        })
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl<O: ManagedObject + Clone + 'static> Store<O> for FailingStatusStore<O> {
    async fn get(&self, key: &ObjectKey) -> control_tower_store::Result<O> {
        self.inner.get(key).await
    }

    async fn create(&self, obj: &mut O) -> control_tower_store::Result<()> {
        self.inner.create(obj).await
    }

    async fn update(&self, obj: &mut O) -> control_tower_store::Result<()> {
        self.inner.update(obj).await
    }

    async fn patch(&self, base: &O, patched: &mut O) -> control_tower_store::Result<()> {
        self.inner.patch(base, patched).await
    }

    async fn update_status(&self, obj: &mut O) -> control_tower_store::Result<()> {
        if self.fail_status_writes.load(Ordering::Relaxed) {
            return Err(StoreError::backend("update_status", "injected failure"));
        }
        self.inner.update_status(obj).await
    }

    async fn delete(&self, key: &ObjectKey) -> control_tower_store::Result<()> {
        self.inner.delete(key).await
    }
}
