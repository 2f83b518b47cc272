//! Error taxonomy. The hot prediction path never returns these for data
//! conditions; empty collections and booleans cover those. Errors are
//! reserved for invalid configuration at the call boundary, calibration
//! aborts, and collaborator failures.

pub type AugurResult<T> = Result<T, AugurError>;

#[derive(Debug, thiserror::Error)]
pub enum AugurError {
    #[error("confidence threshold {value:.3} outside [0, 1]")]
    ThresholdOutOfRange { value: f64 },

    #[error("prediction limit must be at least 1")]
    InvalidPredictionLimit,

    #[error("calibration needs at least {required} samples, have {available}")]
    InsufficientCalibrationData { required: usize, available: usize },

    #[error("recalibration regressed Brier score: candidate {candidate:.4} vs active {active:.4}")]
    CalibrationRegression { candidate: f64, active: f64 },

    #[error("recalibration cancelled")]
    CalibrationCancelled,

    #[error("persistence failed: {reason}")]
    Persistence { reason: String },
}

impl AugurError {
    /// Whether the error is an invalid-configuration rejection (as opposed
    /// to a collaborator or calibration failure).
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AugurError::ThresholdOutOfRange { .. } | AugurError::InvalidPredictionLimit
        )
    }
}
