use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ranked candidate next step produced by a prediction call.
///
/// Not persisted; the id exists so that later feedback can reference the
/// prediction it responds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedState {
    pub id: Uuid,
    /// Step id the workflow is predicted to move to next.
    pub step_id: String,
    /// Markov probability from the transition matrix row, before scoring.
    pub raw_probability: f64,
    /// Multi-factor confidence after calibration, in [0, 1].
    pub calibrated_confidence: f64,
}

/// Recorded result of a past prediction, the unit of the historical-accuracy
/// log and of calibration samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub predicted: String,
    pub actual: String,
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl PredictionOutcome {
    pub fn new(predicted: impl Into<String>, actual: impl Into<String>, correct: bool) -> Self {
        Self {
            predicted: predicted.into(),
            actual: actual.into(),
            correct,
            timestamp: Utc::now(),
        }
    }
}
