use serde::{Deserialize, Serialize};

/// Anonymized engine events. Payloads carry action kinds, counts, and
/// magnitudes only, never step content, document text, or user identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MetricEvent {
    PredictionServed {
        candidate_count: usize,
        confidence_threshold: f64,
    },
    FeedbackProcessed {
        /// "accepted", "rejected", or "modified".
        action: String,
        accuracy_delta: f64,
    },
    Recalibrated {
        brier_before: f64,
        brier_after: f64,
        samples: usize,
    },
}

/// Fire-and-forget metrics collaborator. Implementations must return
/// quickly (queue internally); the engine never blocks on this call and
/// ignores any failure.
pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricEvent);
}

/// Sink that drops every event; the default when no collaborator is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMetricsSink;

impl MetricsSink for NullMetricsSink {
    fn record(&self, _event: MetricEvent) {}
}
