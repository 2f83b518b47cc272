use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the user did with a served prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserAction {
    Accepted,
    Rejected,
    /// The user took a different step than predicted; `actual_next_step`
    /// carries the correction.
    Modified,
}

/// Caller-supplied feedback on a prediction. Consumed once; its effect is
/// folded into the transition matrix and calibration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFeedback {
    pub prediction_id: Uuid,
    pub user_action: UserAction,
    pub actual_next_step: String,
    /// Confidence the prediction was served with, echoed back for
    /// calibration sampling.
    pub observed_confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl PredictionFeedback {
    pub fn new(
        prediction_id: Uuid,
        user_action: UserAction,
        actual_next_step: impl Into<String>,
        observed_confidence: f64,
    ) -> Self {
        Self {
            prediction_id,
            user_action,
            actual_next_step: actual_next_step.into(),
            observed_confidence,
            timestamp: Utc::now(),
        }
    }
}
