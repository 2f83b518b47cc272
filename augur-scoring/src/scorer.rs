//! Weighted combination of the five confidence components.

use serde::{Deserialize, Serialize};

use augur_core::models::ConfidenceComponents;

// Default component weights. Historical evidence leads, pattern and context
// evidence follow, the profile signal is the weakest prior. Must sum to 1.
const W_HISTORICAL: f64 = 0.30;
const W_PATTERN: f64 = 0.25;
const W_CONTEXT: f64 = 0.20;
const W_TEMPORAL: f64 = 0.15;
const W_PROFILE: f64 = 0.10;

/// Clamp a confidence value into [0, 1]. Out-of-range and non-finite inputs
/// are clamped, never propagated.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Tunable weights over the five components; must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    pub historical_accuracy: f64,
    pub pattern_strength: f64,
    pub context_similarity: f64,
    pub user_profile_alignment: f64,
    pub temporal_relevance: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            historical_accuracy: W_HISTORICAL,
            pattern_strength: W_PATTERN,
            context_similarity: W_CONTEXT,
            user_profile_alignment: W_PROFILE,
            temporal_relevance: W_TEMPORAL,
        }
    }
}

impl ComponentWeights {
    pub fn sum(&self) -> f64 {
        self.historical_accuracy
            + self.pattern_strength
            + self.context_similarity
            + self.user_profile_alignment
            + self.temporal_relevance
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-9
    }
}

/// Confidence bucket derived from a calibrated score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceCategory {
    Low,
    Medium,
    High,
}

/// Combines clamped components into a raw confidence score.
///
/// Stateless per call; safe to share across threads and score candidates
/// concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer {
    weights: ComponentWeights,
}

impl ConfidenceScorer {
    pub fn new(weights: ComponentWeights) -> Self {
        debug_assert!(weights.is_normalized(), "component weights must sum to 1");
        Self { weights }
    }

    pub fn weights(&self) -> &ComponentWeights {
        &self.weights
    }

    /// Weighted sum of the clamped components, clamped to [0, 1].
    pub fn score(&self, components: &ConfidenceComponents) -> f64 {
        let w = &self.weights;
        let raw = w.historical_accuracy * clamp_confidence(components.historical_accuracy)
            + w.pattern_strength * clamp_confidence(components.pattern_strength)
            + w.context_similarity * clamp_confidence(components.context_similarity)
            + w.user_profile_alignment * clamp_confidence(components.user_profile_alignment)
            + w.temporal_relevance * clamp_confidence(components.temporal_relevance);
        clamp_confidence(raw)
    }

    /// Map a score to its category given the (low, high) thresholds.
    pub fn categorize(score: f64, low_threshold: f64, high_threshold: f64) -> ConfidenceCategory {
        if score >= high_threshold {
            ConfidenceCategory::High
        } else if score >= low_threshold {
            ConfidenceCategory::Medium
        } else {
            ConfidenceCategory::Low
        }
    }
}

/// Population variance of a set of confidence scores. Used by the stability
/// diagnostics: repeated scoring of near-identical contexts should stay
/// within a small bound.
pub fn confidence_variance(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64
}
