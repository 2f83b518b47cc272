use serde::{Deserialize, Serialize};

use super::defaults;

/// Engine tuning knobs. All fields have documented defaults; a deployment
/// overrides individual values via TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Transitions observed from a step before Markov ranking replaces the
    /// rule-based fallback predictor.
    pub min_observations: u64,
    pub history_capacity: usize,
    /// Half-life of the temporal-relevance decay, in days.
    pub temporal_half_life_days: f64,
    /// EMA step for feedback reinforcement.
    pub ema_alpha: f64,
    /// Phases in workflow order; transitions to an earlier phase are
    /// rejected unless whitelisted in `revision_loops`.
    pub phase_order: Vec<String>,
    /// (from_phase, to_phase) pairs exempt from the phase-order check.
    pub revision_loops: Vec<(String, String)>,
    pub low_confidence_threshold: f64,
    pub high_confidence_threshold: f64,
    pub min_calibration_samples: usize,
    pub recalibration_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_observations: defaults::DEFAULT_MIN_OBSERVATIONS,
            history_capacity: defaults::DEFAULT_HISTORY_CAPACITY,
            temporal_half_life_days: defaults::DEFAULT_TEMPORAL_HALF_LIFE_DAYS,
            ema_alpha: defaults::DEFAULT_EMA_ALPHA,
            phase_order: [
                "planning",
                "solicitation",
                "evaluation",
                "award",
                "administration",
                "closeout",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            revision_loops: vec![
                ("evaluation".into(), "solicitation".into()),
                ("closeout".into(), "administration".into()),
            ],
            low_confidence_threshold: defaults::DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            high_confidence_threshold: defaults::DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            min_calibration_samples: defaults::DEFAULT_MIN_CALIBRATION_SAMPLES,
            recalibration_interval_secs: defaults::DEFAULT_RECALIBRATION_INTERVAL_SECS,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML override file; absent keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = EngineConfig::default();
        assert_eq!(config.phase_order.len(), 6);
        assert!(config.low_confidence_threshold < config.high_confidence_threshold);
        assert!(config.ema_alpha > 0.0 && config.ema_alpha < 1.0);
    }

    #[test]
    fn toml_overrides_only_named_keys() {
        let config = EngineConfig::from_toml_str("min_observations = 10").unwrap();
        assert_eq!(config.min_observations, 10);
        assert_eq!(
            config.history_capacity,
            defaults::DEFAULT_HISTORY_CAPACITY
        );
    }
}
