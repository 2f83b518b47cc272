//! Brier score: mean squared error between predicted probabilities and
//! binary outcomes. Lower is better calibrated; 0.25 is the score of an
//! uninformative constant 0.5 predictor.

use std::sync::atomic::AtomicBool;

use super::{CalibrationSample, PlattCalibrator};

/// Brier score of a calibrator over a sample set. `None` when there are no
/// samples to score against.
pub fn brier_score(calibrator: &PlattCalibrator, samples: &[CalibrationSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples
        .iter()
        .map(|s| {
            let p = calibrator.apply(s.predicted);
            let y = if s.outcome { 1.0 } else { 0.0 };
            (p - y).powi(2)
        })
        .sum();
    Some(sum / samples.len() as f64)
}

/// K-fold cross-validated Brier score of a Platt fit over `samples`.
///
/// Folds are contiguous and deterministic. Each fold is scored by a
/// calibrator fit on the remaining samples; the result is the sample-count
/// weighted mean of the fold scores. Returns `None` on cancellation or when
/// no fold produces a score.
pub fn cross_validated_brier(
    samples: &[CalibrationSample],
    folds: usize,
    cancel: &AtomicBool,
) -> Option<f64> {
    if samples.is_empty() || folds < 2 {
        return brier_score(&PlattCalibrator::fit(samples), samples);
    }

    let folds = folds.min(samples.len());
    let fold_size = samples.len().div_ceil(folds);

    let mut weighted_sum = 0.0;
    let mut scored = 0usize;
    for fold in 0..folds {
        let start = fold * fold_size;
        let end = (start + fold_size).min(samples.len());
        if start >= end {
            continue;
        }

        let holdout = &samples[start..end];
        let train: Vec<CalibrationSample> = samples[..start]
            .iter()
            .chain(samples[end..].iter())
            .copied()
            .collect();
        if train.is_empty() {
            continue;
        }

        let calibrator = PlattCalibrator::fit_cancellable(&train, cancel)?;
        if let Some(score) = brier_score(&calibrator, holdout) {
            weighted_sum += score * holdout.len() as f64;
            scored += holdout.len();
        }
    }

    if scored == 0 {
        None
    } else {
        Some(weighted_sum / scored as f64)
    }
}
