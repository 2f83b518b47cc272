//! Learned transition matrix: fromStep → (toStep → probability).
//!
//! Rows live in a `DashMap` so concurrent writers serialize per row through
//! the entry lock: no update is lost, and each row is renormalized before
//! the lock is released, so the sum-to-one invariant holds on every read.
//!
//! Probabilities derive from per-target weights. Observations add unit
//! weight; feedback adjustments solve for the weight that yields the
//! requested probability while other targets keep their relative shares.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Per-target transition statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionStat {
    /// Unnormalized evidence weight behind this target.
    pub weight: f64,
    /// Number of direct observations of this transition.
    pub observations: u64,
    /// Observations that completed successfully.
    pub successes: u64,
    /// Normalized probability within the row; maintained eagerly.
    pub probability: f64,
    pub last_observed: DateTime<Utc>,
}

impl TransitionStat {
    fn new(weight: f64, at: DateTime<Utc>) -> Self {
        Self {
            weight,
            observations: 0,
            successes: 0,
            probability: 0.0,
            last_observed: at,
        }
    }

    /// Observed success fraction; neutral 0.5 before any observation.
    pub fn success_rate(&self) -> f64 {
        if self.observations == 0 {
            0.5
        } else {
            self.successes as f64 / self.observations as f64
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRow {
    targets: HashMap<String, TransitionStat>,
}

impl TransitionRow {
    fn normalize(&mut self) {
        let total: f64 = self.targets.values().map(|s| s.weight).sum();
        if total <= 0.0 {
            return;
        }
        for stat in self.targets.values_mut() {
            stat.probability = stat.weight / total;
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = (&String, &TransitionStat)> {
        self.targets.iter()
    }
}

/// Concurrency-safe transition matrix.
#[derive(Debug, Default)]
pub struct TransitionMatrix {
    rows: DashMap<String, TransitionRow>,
}

impl TransitionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observed transition. Adds unit weight, updates the
    /// success tally and last-observed timestamp, renormalizes the row.
    pub fn observe(&self, from: &str, to: &str, success: bool, at: DateTime<Utc>) {
        let mut row = self.rows.entry(from.to_string()).or_default();
        let stat = row
            .targets
            .entry(to.to_string())
            .or_insert_with(|| TransitionStat::new(0.0, at));
        stat.weight += 1.0;
        stat.observations += 1;
        if success {
            stat.successes += 1;
        }
        if at > stat.last_observed {
            stat.last_observed = at;
        }
        row.normalize();
    }

    /// Merge an explicit probability for `from → to`, rescaling the other
    /// targets so the row still sums to one.
    ///
    /// A row with no other targets is pinned at probability 1.0; there is
    /// no alternative to shift mass onto until one is observed.
    pub fn set_probability(&self, from: &str, to: &str, probability: f64) {
        // Solving for a weight requires p < 1 when other targets exist.
        let p = probability.clamp(0.0, 0.999);
        let mut row = self.rows.entry(from.to_string()).or_default();

        let other_weight: f64 = row
            .targets
            .iter()
            .filter(|(step, _)| step.as_str() != to)
            .map(|(_, s)| s.weight)
            .sum();

        let now = Utc::now();
        let stat = row
            .targets
            .entry(to.to_string())
            .or_insert_with(|| TransitionStat::new(1.0, now));

        if other_weight > 0.0 {
            stat.weight = p * other_weight / (1.0 - p);
        }
        row.normalize();
    }

    /// Probability of `from → to`; 0.0 when the transition is unseen.
    pub fn probability(&self, from: &str, to: &str) -> f64 {
        self.rows
            .get(from)
            .and_then(|row| row.targets.get(to).map(|s| s.probability))
            .unwrap_or(0.0)
    }

    /// Total direct observations recorded out of `from`.
    pub fn observation_count(&self, from: &str) -> u64 {
        self.rows
            .get(from)
            .map(|row| row.targets.values().map(|s| s.observations).sum())
            .unwrap_or(0)
    }

    /// Cloned snapshot of the row for `from`, for candidate ranking.
    pub fn row(&self, from: &str) -> Option<Vec<(String, TransitionStat)>> {
        self.rows.get(from).map(|row| {
            row.targets
                .iter()
                .map(|(step, stat)| (step.clone(), stat.clone()))
                .collect()
        })
    }

    /// Sum of the row's probabilities, for invariant checks; `None` when
    /// the row does not exist.
    pub fn row_probability_sum(&self, from: &str) -> Option<f64> {
        self.rows
            .get(from)
            .map(|row| row.targets.values().map(|s| s.probability).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&self) {
        self.rows.clear();
    }

    /// Export every row for snapshot persistence.
    pub fn export(&self) -> Vec<(String, TransitionRow)> {
        self.rows
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Replace all rows from a snapshot, renormalizing defensively in case
    /// the blob predates the current weight semantics.
    pub fn import(&self, rows: Vec<(String, TransitionRow)>) {
        self.rows.clear();
        for (from, mut row) in rows {
            row.normalize();
            self.rows.insert(from, row);
        }
    }
}
