//! Platt scaling: a two-parameter logistic transform of raw scores into
//! calibrated probabilities, fit by deterministic gradient descent with
//! Platt's out-of-sample target smoothing.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::CalibrationSample;
use crate::scorer::clamp_confidence;

const FIT_ITERATIONS: usize = 1_000;
const LEARNING_RATE: f64 = 2.0;

/// Logistic calibrator `p = sigmoid(a·score + b)`.
///
/// The identity calibrator passes raw scores through unchanged until a fit
/// has been performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattCalibrator {
    a: f64,
    b: f64,
    fitted: bool,
}

impl Default for PlattCalibrator {
    fn default() -> Self {
        Self::identity()
    }
}

impl PlattCalibrator {
    /// Pass-through calibrator used before any fit.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: -0.5,
            fitted: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Calibrate a raw score. Pass-through (clamped) when unfitted.
    pub fn apply(&self, score: f64) -> f64 {
        let score = clamp_confidence(score);
        if !self.fitted {
            return score;
        }
        sigmoid(self.a * score + self.b)
    }

    /// Fit on (predicted, outcome) pairs with smoothed targets
    /// `t+ = (n+ + 1)/(n+ + 2)`, `t- = 1/(n- + 2)` to keep the fit from
    /// saturating on small samples. Deterministic: fixed initialization,
    /// fixed iteration count, no randomness.
    pub fn fit(samples: &[CalibrationSample]) -> Self {
        // Uncancellable fit: the flag is never set.
        let never = AtomicBool::new(false);
        Self::fit_cancellable(samples, &never).unwrap_or_else(Self::identity)
    }

    /// Cancellable fit for background recalibration. Returns `None` when the
    /// cancel flag is raised mid-fit; no partial parameters escape.
    pub fn fit_cancellable(samples: &[CalibrationSample], cancel: &AtomicBool) -> Option<Self> {
        if samples.is_empty() {
            return Some(Self::identity());
        }

        let n_pos = samples.iter().filter(|s| s.outcome).count() as f64;
        let n_neg = samples.len() as f64 - n_pos;
        let target_pos = (n_pos + 1.0) / (n_pos + 2.0);
        let target_neg = 1.0 / (n_neg + 2.0);

        let mut a = 1.0;
        let mut b = -0.5;
        let n = samples.len() as f64;

        for iteration in 0..FIT_ITERATIONS {
            // Cancellation is cooperative; check between gradient steps.
            if iteration % 32 == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }

            let mut grad_a = 0.0;
            let mut grad_b = 0.0;
            for sample in samples {
                let target = if sample.outcome { target_pos } else { target_neg };
                let p = sigmoid(a * sample.predicted + b);
                let error = p - target;
                grad_a += error * sample.predicted;
                grad_b += error;
            }

            a -= LEARNING_RATE * grad_a / n;
            b -= LEARNING_RATE * grad_b / n;
        }

        Some(Self { a, b, fitted: true })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
