//! Calibration diagnostics as structured data: reliability-diagram bins and
//! overall accuracy. No rendering here; downstream dashboards consume these.

use serde::{Deserialize, Serialize};

use super::CalibrationSample;

/// One confidence bin of a reliability diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    /// Inclusive lower edge of the bin.
    pub lower: f64,
    /// Exclusive upper edge (inclusive for the last bin).
    pub upper: f64,
    /// Mean predicted confidence of the samples in the bin.
    pub mean_predicted: f64,
    /// Fraction of bin samples whose outcome was positive.
    pub observed_frequency: f64,
    pub sample_size: usize,
}

/// Binned reliability data plus the overall hit rate. A well-calibrated
/// predictor has `mean_predicted ≈ observed_frequency` in every populated
/// bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityDiagram {
    pub bins: Vec<CalibrationBin>,
    pub overall_accuracy: f64,
}

/// Bin samples by predicted confidence into `bin_count` equal-width bins.
/// Empty bins are retained with zeroed statistics so consumers see the full
/// axis.
pub fn reliability_diagram(samples: &[CalibrationSample], bin_count: usize) -> ReliabilityDiagram {
    let bin_count = bin_count.max(1);
    let width = 1.0 / bin_count as f64;

    let mut predicted_sums = vec![0.0f64; bin_count];
    let mut positive_counts = vec![0usize; bin_count];
    let mut sizes = vec![0usize; bin_count];

    for sample in samples {
        let index = ((sample.predicted / width) as usize).min(bin_count - 1);
        predicted_sums[index] += sample.predicted;
        if sample.outcome {
            positive_counts[index] += 1;
        }
        sizes[index] += 1;
    }

    let bins = (0..bin_count)
        .map(|i| {
            let size = sizes[i];
            CalibrationBin {
                lower: i as f64 * width,
                upper: (i + 1) as f64 * width,
                mean_predicted: if size > 0 {
                    predicted_sums[i] / size as f64
                } else {
                    0.0
                },
                observed_frequency: if size > 0 {
                    positive_counts[i] as f64 / size as f64
                } else {
                    0.0
                },
                sample_size: size,
            }
        })
        .collect();

    let positives = samples.iter().filter(|s| s.outcome).count();
    let overall_accuracy = if samples.is_empty() {
        0.0
    } else {
        positives as f64 / samples.len() as f64
    };

    ReliabilityDiagram {
        bins,
        overall_accuracy,
    }
}
