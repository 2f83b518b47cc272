use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::WorkflowState;

/// Structured context attributes attached to a pattern or a prediction
/// request. Context similarity scoring operates on these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub document_type: String,
    /// Contracting agency (e.g. "DOD", "NASA").
    #[serde(default)]
    pub agency: String,
    /// Monetary magnitude of the action, in whole dollars.
    #[serde(default)]
    pub value: f64,
    /// Coarse complexity label ("low", "medium", "high").
    #[serde(default)]
    pub complexity: String,
    /// Timeline label ("expedited", "standard", "extended").
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl WorkflowContext {
    pub fn new(document_type: impl Into<String>) -> Self {
        Self {
            document_type: document_type.into(),
            agency: String::new(),
            value: 0.0,
            complexity: String::new(),
            timeline: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Derive a context from a raw workflow state, lifting the well-known
    /// metadata keys into structured fields.
    pub fn from_state(state: &WorkflowState) -> Self {
        let lookup = |key: &str| state.metadata.get(key).cloned().unwrap_or_default();
        Self {
            document_type: state.document_type.clone(),
            agency: lookup("agency"),
            value: lookup("value").parse().unwrap_or(0.0),
            complexity: lookup("complexity"),
            timeline: lookup("timeline"),
            metadata: state.metadata.clone(),
        }
    }
}
