//! Confidence calibration: Platt scaling fit against observed outcomes,
//! Brier-score validation, reliability diagnostics, and the guarded
//! active-model store.

pub mod brier;
pub mod diagnostics;
pub mod platt;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use brier::{brier_score, cross_validated_brier};
pub use diagnostics::{reliability_diagram, CalibrationBin, ReliabilityDiagram};
pub use platt::PlattCalibrator;
pub use store::{CalibrationStore, RecalibrationReport};

/// One (predicted confidence, actual outcome) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Confidence the prediction was served with, in [0, 1].
    pub predicted: f64,
    /// Whether the prediction turned out correct.
    pub outcome: bool,
    pub observed_at: DateTime<Utc>,
}

impl CalibrationSample {
    pub fn new(predicted: f64, outcome: bool) -> Self {
        Self {
            predicted: predicted.clamp(0.0, 1.0),
            outcome,
            observed_at: Utc::now(),
        }
    }
}
