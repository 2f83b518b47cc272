//! Per-signal factor computations. Each returns a value in [0, 1].

use chrono::{DateTime, Utc};

use augur_core::config::defaults;
use augur_core::models::{ExpertiseRequirement, Pattern, PredictionOutcome, UserProfile};

use crate::similarity::sequence_similarity;

/// Recency-weighted average of past prediction correctness.
///
/// Outcomes are ordered oldest to newest; each step back in time multiplies
/// the weight by `decay`, so recent outcomes dominate. Returns a neutral 0.5
/// when there is no history to judge by.
pub fn historical_accuracy(outcomes: &[PredictionOutcome], decay: f64) -> f64 {
    if outcomes.is_empty() {
        return 0.5;
    }

    let mut weight = 1.0;
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for outcome in outcomes.iter().rev() {
        if outcome.correct {
            weighted_sum += weight;
        }
        weight_total += weight;
        weight *= decay;
    }

    weighted_sum / weight_total
}

/// Exponential half-life decay of elapsed time since an observation.
///
/// `0.5^(age / half_life)`: an observation exactly one half-life old scores
/// 0.5, a fresh one scores 1.0. Future timestamps and a non-positive
/// half-life both score 1.0.
pub fn temporal_relevance(observed_at: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    if half_life_days <= 0.0 {
        return 1.0;
    }
    let age_days = (now - observed_at).num_seconds() as f64 / 86_400.0;
    if age_days <= 0.0 {
        return 1.0;
    }
    0.5_f64.powf(age_days / half_life_days)
}

/// Strongest supporting evidence among candidate patterns for a target step
/// sequence: fuzzy sequence similarity scaled by the pattern's success rate
/// and the recency of its last observation.
pub fn pattern_strength(
    target_sequence: &[String],
    patterns: &[Pattern],
    now: DateTime<Utc>,
    half_life_days: f64,
) -> f64 {
    patterns
        .iter()
        .map(|p| {
            let similarity = sequence_similarity(target_sequence, &p.sequence);
            let recency = temporal_relevance(p.last_observed_at, now, half_life_days);
            similarity * p.success_rate.clamp(0.0, 1.0) * recency
        })
        .fold(0.0, f64::max)
}

/// User expertise against the workflow's required expertise.
///
/// Meeting or exceeding the requirement in the relevant domain scores 1.0 on
/// the match axis; a shortfall scales down proportionally to how far below
/// the requirement the user sits. The match is blended with the user's
/// overall success history.
pub fn user_profile_alignment(profile: &UserProfile, requirement: &ExpertiseRequirement) -> f64 {
    let have = f64::from(profile.level_for(&requirement.domain).rank());
    let need = f64::from(requirement.required.rank());

    let level_match = if have >= need {
        1.0
    } else {
        (have + 1.0) / (need + 1.0)
    };

    let blended = 0.7 * level_match + 0.3 * profile.success_history.clamp(0.0, 1.0);
    blended.clamp(0.0, 1.0)
}

/// Default geometric decay for [`historical_accuracy`].
pub fn default_accuracy_decay() -> f64 {
    defaults::DEFAULT_ACCURACY_RECENCY_DECAY
}
