//! Versioned snapshot of state-machine state for opaque persistence.

use serde::{Deserialize, Serialize};

use augur_core::errors::{AugurError, AugurResult};
use augur_core::models::{PredictionOutcome, WorkflowState};

use crate::matrix::TransitionRow;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything the state machine needs to restore itself. Serialized to JSON
/// and handed to the `StateStore` as opaque bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    pub current: Option<WorkflowState>,
    /// History entries, oldest first.
    pub history: Vec<WorkflowState>,
    pub matrix: Vec<(String, TransitionRow)>,
    pub outcomes: Vec<PredictionOutcome>,
}

impl StateSnapshot {
    pub fn to_bytes(&self) -> AugurResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| AugurError::Persistence {
            reason: format!("snapshot encode: {e}"),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> AugurResult<Self> {
        let snapshot: Self = serde_json::from_slice(bytes).map_err(|e| AugurError::Persistence {
            reason: format!("snapshot decode: {e}"),
        })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AugurError::Persistence {
                reason: format!(
                    "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let snapshot = StateSnapshot {
            version: SNAPSHOT_VERSION,
            current: Some(WorkflowState::new("review", "final_approval", "Contract")),
            history: vec![WorkflowState::new("planning", "market_research", "Contract")],
            matrix: Vec::new(),
            outcomes: Vec::new(),
        };

        let bytes = snapshot.to_bytes().unwrap();
        let restored = StateSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(
            restored.current.as_ref().map(|s| s.current_step.as_str()),
            Some("final_approval")
        );
        assert_eq!(restored.history.len(), 1);
    }

    #[test]
    fn rejects_unknown_versions() {
        let mut snapshot = StateSnapshot {
            version: SNAPSHOT_VERSION,
            current: None,
            history: Vec::new(),
            matrix: Vec::new(),
            outcomes: Vec::new(),
        };
        snapshot.version = 99;
        let bytes = snapshot.to_bytes().unwrap();
        assert!(StateSnapshot::from_bytes(&bytes).is_err());
    }
}
