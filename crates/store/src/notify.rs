//! Notification events attached to managed objects.

use std::sync::Mutex;

use control_tower_api::ObjectKey;
use tracing::{info, warn};

/// Severity of a notification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
}

/// Sink for notification events referencing a managed object.
///
/// Emission is fire-and-forget; a sink that drops events must never affect
/// reconciliation.
pub trait Notifier: Send + Sync {
    /// Emit one event.
    fn emit(&self, object: &ObjectKey, severity: Severity, reason: &str, message: &str);
}

/// Notifier that routes events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn emit(&self, object: &ObjectKey, severity: Severity, reason: &str, message: &str) {
        match severity {
            Severity::Normal => info!(object = %object, reason, message, "Event"),
            Severity::Warning => warn!(object = %object, reason, message, "Event"),
        }
    }
}

/// A captured notification event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub object: ObjectKey,
    pub severity: Severity,
    pub reason: String,
    pub message: String,
}

/// Notifier that records events for test assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events captured so far, in emission order.
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn emit(&self, object: &ObjectKey, severity: Severity, reason: &str, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(Notification {
                object: object.clone(),
                severity,
                reason: reason.to_string(),
                message: message.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_preserves_emission_order() {
        let notifier = RecordingNotifier::new();
        let key = ObjectKey::new("prod", "db");

        notifier.emit(&key, Severity::Warning, "ProcessingError", "boom");
        notifier.emit(&key, Severity::Normal, "Reconciled", "ok");

        let events = notifier.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events.first().map(|e| e.severity),
            Some(Severity::Warning)
        );
        assert_eq!(events.first().map(|e| e.reason.as_str()), Some("ProcessingError"));
        assert_eq!(events.last().map(|e| e.severity), Some(Severity::Normal));
    }
}
