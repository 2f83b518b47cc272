use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WorkflowContext;

/// Kind tag on a learned pattern. Only `WorkflowSequence` patterns
/// participate in transition and confidence computation; the repository also
/// stores form-fill and timing patterns that must be filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    WorkflowSequence,
    FieldValues,
    Timing,
}

/// A recorded historical workflow step sequence with outcome statistics.
///
/// Owned by the external pattern repository; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub kind: PatternKind,
    /// Ordered step ids making up the observed sequence.
    pub sequence: Vec<String>,
    pub context: WorkflowContext,
    /// How many times this sequence has been observed.
    pub frequency: u32,
    /// Fraction of observations that completed successfully, in [0, 1].
    pub success_rate: f64,
    pub last_observed_at: DateTime<Utc>,
}

impl Pattern {
    /// Whether the pattern is relevant to a prediction for `document_type`
    /// starting at `current_step`: either the document types match or the
    /// pattern's sequence passes through the step.
    pub fn is_relevant_to(&self, document_type: &str, current_step: &str) -> bool {
        self.context.document_type == document_type
            || self.sequence.iter().any(|s| s == current_step)
    }
}
