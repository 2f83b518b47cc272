use serde::{Deserialize, Serialize};

use super::defaults;

/// Privacy configuration snapshot pushed by the external config store.
/// The engine only reads the latest snapshot; it never mutates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacySettings {
    /// Master switch: when false, every prediction call returns empty.
    pub enable_predictions: bool,
    /// How long outcome and audit data may be retained.
    pub data_retention_days: u32,
    /// Whether anonymized metric events may be emitted.
    pub allow_analytics: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            enable_predictions: true,
            data_retention_days: defaults::DEFAULT_DATA_RETENTION_DAYS,
            allow_analytics: true,
        }
    }
}
