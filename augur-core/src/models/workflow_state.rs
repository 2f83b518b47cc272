use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A point-in-time observation of a document workflow.
///
/// Immutable value: callers construct a fresh state on every observation,
/// the engine never mutates one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Workflow phase (e.g. "planning", "evaluation").
    pub phase: String,
    /// Current step id within the phase.
    pub current_step: String,
    /// Document type driving the workflow (e.g. "RFP", "Contract").
    pub document_type: String,
    /// Free-form context attributes.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl WorkflowState {
    pub fn new(
        phase: impl Into<String>,
        current_step: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            phase: phase.into(),
            current_step: current_step.into(),
            document_type: document_type.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
