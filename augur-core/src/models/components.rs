use serde::{Deserialize, Serialize};

/// The five independent confidence signals, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceComponents {
    /// Recency-weighted average of past prediction correctness.
    pub historical_accuracy: f64,
    /// Fuzzy sequence-similarity against matching historical patterns.
    pub pattern_strength: f64,
    /// Normalized distance over structured context attributes.
    pub context_similarity: f64,
    /// User expertise vs the workflow's required expertise.
    pub user_profile_alignment: f64,
    /// Decay-weighted recency of the contributing observations.
    pub temporal_relevance: f64,
}

impl Default for ConfidenceComponents {
    fn default() -> Self {
        Self {
            historical_accuracy: 0.5,
            pattern_strength: 0.5,
            context_similarity: 0.5,
            user_profile_alignment: 0.5,
            temporal_relevance: 1.0,
        }
    }
}
