// Single source of truth for all default values.

// --- Prediction ---
pub const DEFAULT_MAX_PREDICTIONS: usize = 5;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Transitions observed from a step before Markov ranking replaces the
/// rule-based fallback.
pub const DEFAULT_MIN_OBSERVATIONS: u64 = 5;
pub const DEFAULT_HISTORY_CAPACITY: usize = 1_000;

// --- Scoring ---
pub const DEFAULT_TEMPORAL_HALF_LIFE_DAYS: f64 = 30.0;
/// EMA step for feedback-driven probability and accuracy updates.
pub const DEFAULT_EMA_ALPHA: f64 = 0.3;
/// Geometric decay applied per step of outcome age in the
/// historical-accuracy average.
pub const DEFAULT_ACCURACY_RECENCY_DECAY: f64 = 0.9;
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.4;
pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

// --- Calibration ---
pub const DEFAULT_MIN_CALIBRATION_SAMPLES: usize = 20;
pub const DEFAULT_CALIBRATION_FOLDS: usize = 5;
pub const DEFAULT_CALIBRATION_SAMPLE_CAPACITY: usize = 5_000;
pub const DEFAULT_RECALIBRATION_INTERVAL_SECS: u64 = 604_800; // weekly
/// Brier score the calibrator aims to stay under.
pub const DEFAULT_BRIER_TARGET: f64 = 0.05;

// --- Privacy ---
pub const DEFAULT_DATA_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_AUDIT_LOG_CAPACITY: usize = 256;
pub const DEFAULT_OUTCOME_LOG_CAPACITY: usize = 1_000;
pub const DEFAULT_PREDICTION_RECORD_CAPACITY: usize = 512;
