use serde::{Deserialize, Serialize};

use super::defaults;

/// Feature flag snapshot pushed by the external config store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub enable_predictions: bool,
    /// Whether downstream automation may act on predictions without
    /// confirmation. Read by callers, not by the engine itself.
    pub enable_auto_execution: bool,
    pub max_predictions: usize,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_predictions: true,
            enable_auto_execution: false,
            max_predictions: defaults::DEFAULT_MAX_PREDICTIONS,
        }
    }
}
