//! Status vocabulary recorded on managed objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state value of a status condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Name of a condition kind, e.g. `DatabaseReady`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionType(String);

impl ConditionType {
    /// Create a condition type from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The type name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConditionType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Machine-readable code explaining how a condition got its status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionReason(String);

impl ConditionReason {
    /// Create a condition reason from a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The reason code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConditionReason {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl std::fmt::Display for ConditionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed, timestamped status fact recorded on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Kind of fact this condition records.
    pub condition_type: ConditionType,
    /// Current verdict.
    pub status: ConditionStatus,
    /// Machine-readable reason code.
    pub reason: ConditionReason,
    /// Human-readable detail.
    pub message: String,
    /// Last time the condition was written.
    pub last_update: DateTime<Utc>,
}

/// Readiness summary for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyStatus {
    /// Last time the status was updated.
    pub last_update: DateTime<Utc>,
    /// Failure reason in human-readable form, when not ready.
    pub reason: Option<String>,
    /// Whether the resource is ready to be used.
    pub ready: bool,
}

impl ReadyStatus {
    /// Readiness status of a healthy resource.
    pub fn ok(now: DateTime<Utc>) -> Self {
        Self {
            last_update: now,
            reason: None,
            ready: true,
        }
    }

    /// Readiness status of a failed resource.
    pub fn failed(reason: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            last_update: now,
            reason: Some(reason.into()),
            ready: false,
        }
    }
}

/// Upsert `condition` into `conditions`, replacing any entry of the same
/// type and appending otherwise.
///
/// Returns whether anything other than the timestamp changed.
pub fn upsert_condition(conditions: &mut Vec<Condition>, condition: Condition) -> bool {
    let position = conditions
        .iter()
        .position(|c| c.condition_type == condition.condition_type);
    match position {
        Some(index) => {
            let changed = conditions.get(index).is_some_and(|existing| {
                existing.status != condition.status
                    || existing.reason != condition.reason
                    || existing.message != condition.message
            });
            if let Some(slot) = conditions.get_mut(index) {
                *slot = condition;
            }
            changed
        }
        None => {
            conditions.push(condition);
            true
        }
    }
}
