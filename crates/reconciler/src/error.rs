//! Classified reconciliation errors.
//!
//! Failures are modeled as a closed discriminated union so the requeue
//! policy can pattern-match instead of probing a type hierarchy. Display
//! always yields the innermost error's message; classification data rides
//! alongside it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use control_tower_api::{Condition, ConditionReason, ConditionStatus, ConditionType};
use control_tower_store::StoreError;
use thiserror::Error;

/// Boxed source error carried inside a classified error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// The failure classes the requeue policy understands.
///
/// Constructed at the point of failure, consumed exactly once by
/// [`Reconciler::manage_error`](crate::Reconciler::manage_error), never
/// persisted.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Unclassified failure. Requeued immediately with the error surfaced,
    /// so the external trigger's own backoff governs timing.
    #[error("{source}")]
    Unclassified { source: BoxError },

    /// Failure that should also be recorded as a status condition on the
    /// object. Unwrapped and re-classified after the condition is set.
    #[error("{source}")]
    Condition {
        condition_type: ConditionType,
        reason: ConditionReason,
        source: Box<ReconcileError>,
    },

    /// Durable failure; retrying soon will not help.
    #[error("{source}")]
    NotRetriable { source: BoxError },

    /// Transient failure with a recommended wait before the next attempt.
    #[error("{source}")]
    Retriable {
        retry_after: Duration,
        source: BoxError,
    },
}

impl ReconcileError {
    /// Wrap an unclassified error.
    pub fn unclassified(issue: impl Into<BoxError>) -> Self {
        Self::Unclassified {
            source: issue.into(),
        }
    }

    /// Wrap `issue` with a condition of the given type and the default
    /// `Failed` reason.
    pub fn condition(condition_type: impl Into<ConditionType>, issue: impl Into<BoxError>) -> Self {
        Self::condition_with_reason(condition_type, "Failed", issue)
    }

    /// Wrap `issue` with a condition carrying an explicit reason code.
    pub fn condition_with_reason(
        condition_type: impl Into<ConditionType>,
        reason: impl Into<ConditionReason>,
        issue: impl Into<BoxError>,
    ) -> Self {
        Self::Condition {
            condition_type: condition_type.into(),
            reason: reason.into(),
            source: Box::new(Self::unclassified(issue)),
        }
    }

    /// Layer a condition over an already classified error, preserving the
    /// inner classification for the requeue policy.
    pub fn condition_wrapping(
        condition_type: impl Into<ConditionType>,
        reason: impl Into<ConditionReason>,
        inner: ReconcileError,
    ) -> Self {
        Self::Condition {
            condition_type: condition_type.into(),
            reason: reason.into(),
            source: Box::new(inner),
        }
    }

    /// Mark `issue` as durably broken.
    pub fn not_retriable(issue: impl Into<BoxError>) -> Self {
        Self::NotRetriable {
            source: issue.into(),
        }
    }

    /// Mark `issue` as transient with a recommended retry delay.
    pub fn retriable(retry_after: Duration, issue: impl Into<BoxError>) -> Self {
        Self::Retriable {
            retry_after,
            source: issue.into(),
        }
    }

    /// Build the condition this error asks to persist, if any.
    pub fn to_condition(&self, now: DateTime<Utc>) -> Option<Condition> {
        match self {
            Self::Condition {
                condition_type,
                reason,
                source,
            } => Some(Condition {
                condition_type: condition_type.clone(),
                status: ConditionStatus::False,
                reason: reason.clone(),
                message: source.to_string(),
                last_update: now,
            }),
            _ => None,
        }
    }
}

impl From<StoreError> for ReconcileError {
    fn from(err: StoreError) -> Self {
        Self::unclassified(err)
    }
}
