//! Owns the active calibrator and the accumulated sample window, and guards
//! recalibration so a worse-calibrated model is never swapped in.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use augur_core::config::defaults;
use augur_core::errors::{AugurError, AugurResult};

use super::brier::{brier_score, cross_validated_brier};
use super::{CalibrationSample, PlattCalibrator};

/// Result of a successful recalibration pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecalibrationReport {
    pub samples: usize,
    /// Brier score of the previously active model on the sample window.
    pub brier_before: f64,
    /// Brier score of the newly fitted model on the same window.
    pub brier_after: f64,
    /// Cross-validated Brier score of the new fit.
    pub cv_brier: f64,
}

/// Active-calibrator cell plus a bounded FIFO window of calibration samples.
///
/// Readers on the prediction path take the read lock only long enough to
/// apply the transform; the fit itself runs on a snapshot outside any lock,
/// so in-flight predictions keep the previous model until the swap.
pub struct CalibrationStore {
    active: RwLock<PlattCalibrator>,
    samples: Mutex<VecDeque<CalibrationSample>>,
    sample_capacity: usize,
    min_samples: usize,
    folds: usize,
}

impl Default for CalibrationStore {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_CALIBRATION_SAMPLE_CAPACITY,
            defaults::DEFAULT_MIN_CALIBRATION_SAMPLES,
            defaults::DEFAULT_CALIBRATION_FOLDS,
        )
    }
}

impl CalibrationStore {
    pub fn new(sample_capacity: usize, min_samples: usize, folds: usize) -> Self {
        Self {
            active: RwLock::new(PlattCalibrator::identity()),
            samples: Mutex::new(VecDeque::with_capacity(sample_capacity.min(1_024))),
            sample_capacity: sample_capacity.max(1),
            min_samples,
            folds,
        }
    }

    /// Apply the active calibrator to a raw score.
    pub fn calibrate(&self, raw_score: f64) -> f64 {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(raw_score)
    }

    pub fn active_calibrator(&self) -> PlattCalibrator {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an observed (confidence, outcome) pair, evicting the oldest
    /// sample once the window is full.
    pub fn push_sample(&self, sample: CalibrationSample) {
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        if samples.len() == self.sample_capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    pub fn sample_count(&self) -> usize {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop all accumulated samples (privacy clear).
    pub fn clear_samples(&self) {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drop samples older than the retention window.
    pub fn prune_older_than(&self, retention_days: u32) {
        let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(retention_days));
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| s.observed_at >= cutoff);
    }

    /// Refit on the accumulated window and swap the new model in only if
    /// it does not regress the Brier score of the active model on
    /// the same window.
    ///
    /// Errors leave the active model untouched: insufficient data,
    /// cancellation (partial progress discarded), and detected regression
    /// all abort without mutation.
    pub fn try_recalibrate(&self, cancel: &AtomicBool) -> AugurResult<RecalibrationReport> {
        let snapshot: Vec<CalibrationSample> = {
            let samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
            samples.iter().copied().collect()
        };

        if snapshot.len() < self.min_samples {
            return Err(AugurError::InsufficientCalibrationData {
                required: self.min_samples,
                available: snapshot.len(),
            });
        }

        let candidate = PlattCalibrator::fit_cancellable(&snapshot, cancel)
            .ok_or(AugurError::CalibrationCancelled)?;
        let cv_brier = cross_validated_brier(&snapshot, self.folds, cancel)
            .ok_or(AugurError::CalibrationCancelled)?;

        let active = self.active_calibrator();
        // Both models are scored on the same window; brier_score only
        // returns None on an empty window, which the length check rules out.
        let brier_before = brier_score(&active, &snapshot).unwrap_or(f64::MAX);
        let brier_after = brier_score(&candidate, &snapshot).unwrap_or(f64::MAX);

        if brier_after > brier_before {
            warn!(
                brier_before,
                brier_after, "recalibration regressed, keeping active model"
            );
            return Err(AugurError::CalibrationRegression {
                candidate: brier_after,
                active: brier_before,
            });
        }

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = candidate;
        info!(
            samples = snapshot.len(),
            brier_before, brier_after, cv_brier, "recalibration swapped in a new model"
        );

        Ok(RecalibrationReport {
            samples: snapshot.len(),
            brier_before,
            brier_after,
            cv_brier,
        })
    }
}
