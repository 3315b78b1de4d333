//! Managed-object contract and optional status capabilities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::{Condition, ReadyStatus};

/// Key addressing a managed object in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Namespace the object lives in.
    pub namespace: String,
    /// Name of the object, unique within its namespace.
    pub name: String,
}

impl ObjectKey {
    /// Create a key from a namespace and a name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Back-reference from a derived object to the object that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    /// Name of the owning object.
    pub name: String,
    /// Namespace of the owning object.
    pub namespace: String,
}

impl OwnerRef {
    /// Build a reference to `owner`.
    pub fn of(owner: &dyn ManagedObject) -> Self {
        Self {
            name: owner.name().to_string(),
            namespace: owner.namespace().to_string(),
        }
    }
}

/// Contract every object managed by the toolkit satisfies.
///
/// Mutators exist only for the fields the toolkit itself maintains: the
/// namespace (defaulted from the owner), the finalizer marker set, the
/// optimistic-concurrency version token and the owner back-reference.
/// Status surfaces are optional capabilities resolved once per operation
/// through [`ManagedObject::as_ready_status`] and
/// [`ManagedObject::as_conditions`]; both default to absent.
pub trait ManagedObject: Send + Sync {
    /// Name of the object, unique within its namespace.
    fn name(&self) -> &str;

    /// Namespace the object lives in. Empty when unset.
    fn namespace(&self) -> &str;

    /// Set the namespace.
    fn set_namespace(&mut self, namespace: &str);

    /// Key of this object in the backing store.
    fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace(), self.name())
    }

    /// Look up an annotation value.
    fn annotation(&self, key: &str) -> Option<&str>;

    /// Whether deletion of this object has been requested.
    fn deletion_requested(&self) -> bool;

    /// Finalizer markers currently set on the object.
    fn finalizers(&self) -> &[String];

    /// Replace the finalizer marker set.
    fn set_finalizers(&mut self, finalizers: Vec<String>);

    /// Version token for optimistic-concurrency updates.
    fn version(&self) -> Option<&str>;

    /// Replace the version token.
    fn set_version(&mut self, version: Option<String>);

    /// Record the owner back-reference.
    fn set_owner(&mut self, owner: OwnerRef);

    /// Readiness-status capability, when this object carries one.
    fn as_ready_status(&mut self) -> Option<&mut dyn ReadyStatusAware> {
        None
    }

    /// Condition-list capability, when this object carries one.
    fn as_conditions(&mut self) -> Option<&mut dyn ConditionsAware> {
        None
    }
}

/// Capability of objects that expose a readiness summary.
pub trait ReadyStatusAware {
    /// The current readiness summary, if one has been recorded.
    fn ready_status(&self) -> Option<&ReadyStatus>;

    /// Replace the readiness summary.
    fn set_ready_status(&mut self, status: ReadyStatus);
}

/// Capability of objects that expose a condition list.
pub trait ConditionsAware {
    /// Upsert a condition, replacing any existing entry of the same type.
    ///
    /// Returns whether the recorded status changed.
    fn set_condition(&mut self, condition: Condition) -> bool;
}
