//! Error types for store operations.

use control_tower_api::ObjectKey;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store operation failures.
///
/// `NotFound` and `AlreadyExists` are ordinary outcomes callers branch on;
/// the predicate helpers keep that check in one place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No object is stored under the key.
    #[error("object '{key}' not found")]
    NotFound { key: ObjectKey },

    /// An object is already stored under the key.
    #[error("object '{key}' already exists")]
    AlreadyExists { key: ObjectKey },

    /// The version token carried by the update did not match the stored
    /// object.
    #[error("version conflict on '{key}': expected {expected}, found {found}")]
    Conflict {
        key: ObjectKey,
        expected: String,
        found: String,
    },

    /// The backing store itself failed.
    #[error("store operation '{operation}' failed: {reason}")]
    Backend { operation: String, reason: String },
}

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(key: ObjectKey) -> Self {
        Self::NotFound { key }
    }

    /// Create an already-exists error.
    pub fn already_exists(key: ObjectKey) -> Self {
        Self::AlreadyExists { key }
    }

    /// Create a version-conflict error.
    pub fn conflict(
        key: ObjectKey,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            key,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a backend failure.
    pub fn backend(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is the distinguishable not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is the distinguishable already-exists outcome.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        let err = StoreError::not_found(ObjectKey::new("prod", "db"));
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
        assert!(err.to_string().contains("prod/db"));
    }

    #[test]
    fn conflict_names_both_versions() {
        let err = StoreError::conflict(ObjectKey::new("prod", "db"), "3", "7");
        assert!(err.to_string().contains("expected 3"));
        assert!(err.to_string().contains("found 7"));
    }
}
