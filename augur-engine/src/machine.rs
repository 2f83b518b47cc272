//! Probabilistic workflow state machine.
//!
//! Single owner of the current state, the learned transition matrix, the
//! bounded history buffer, and the outcome log. Every mutation goes through
//! this type's narrow API; readers always see a consistent snapshot. All
//! query operations are total: empty results and booleans signal the
//! degenerate cases, nothing on the prediction path panics or errors.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use augur_core::config::{defaults, EngineConfig};
use augur_core::models::{
    ConfidenceComponents, ExpertiseRequirement, Pattern, PredictedState, PredictionOutcome,
    UserProfile, WorkflowContext, WorkflowState,
};
use augur_core::traits::{NullStateStore, StateStore};
use augur_scoring::calibration::CalibrationStore;
use augur_scoring::factors;
use augur_scoring::similarity::context_similarity;
use augur_scoring::ConfidenceScorer;

use crate::fallback;
use crate::history::HistoryBuffer;
use crate::matrix::TransitionMatrix;
use crate::phases::PhaseTable;
use crate::snapshot::{StateSnapshot, SNAPSHOT_VERSION};

/// External evidence handed down by the learning engine for a prediction
/// call: relevant patterns, the request context, and the user profile.
/// All optional; the machine falls back to its own transition statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringInputs<'a> {
    pub patterns: &'a [Pattern],
    pub context: Option<&'a WorkflowContext>,
    pub profile: Option<&'a UserProfile>,
    pub requirement: Option<&'a ExpertiseRequirement>,
}

pub struct WorkflowStateMachine {
    config: EngineConfig,
    scorer: ConfidenceScorer,
    calibration: Arc<CalibrationStore>,
    store: Arc<dyn StateStore>,
    phases: PhaseTable,
    current: RwLock<Option<WorkflowState>>,
    history: Mutex<HistoryBuffer>,
    outcomes: Mutex<VecDeque<PredictionOutcome>>,
    matrix: TransitionMatrix,
}

impl WorkflowStateMachine {
    pub fn new(
        config: EngineConfig,
        calibration: Arc<CalibrationStore>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let history = HistoryBuffer::new(config.history_capacity);
        let phases = PhaseTable::from_config(&config);
        Self {
            config,
            scorer: ConfidenceScorer::default(),
            calibration,
            store,
            phases,
            current: RwLock::new(None),
            history: Mutex::new(history),
            outcomes: Mutex::new(VecDeque::new()),
            matrix: TransitionMatrix::new(),
        }
    }

    /// Machine with default config, fresh calibration state, and no
    /// persistence. The composition-root constructor for tests and simple
    /// embeddings.
    pub fn with_defaults() -> Self {
        Self::new(
            EngineConfig::default(),
            Arc::new(CalibrationStore::default()),
            Arc::new(NullStateStore),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- State management ---

    /// Replace the current state, pushing the previous one into history.
    pub fn update_current_state(&self, state: WorkflowState) {
        let previous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            current.replace(state)
        };
        if let Some(previous) = previous {
            self.add_to_history(previous);
        }
    }

    /// Consistent snapshot of the current state; never observes a partial
    /// write.
    pub fn current_state(&self) -> Option<WorkflowState> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn add_to_history(&self, state: WorkflowState) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state);
    }

    pub fn history_count(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // --- Transition management ---

    /// Record one observed transition with its outcome.
    pub fn observe_transition(&self, from: &str, to: &str, success: bool, at: DateTime<Utc>) {
        self.matrix.observe(from, to, success, at);
    }

    /// Merge an explicit probability into the matrix; the row is
    /// renormalized before the write completes.
    pub fn update_transition_probability(&self, from: &str, to: &str, probability: f64) {
        self.matrix.set_probability(from, to, probability);
    }

    pub fn transition_probability(&self, from: &str, to: &str) -> f64 {
        self.matrix.probability(from, to)
    }

    pub fn observation_count(&self, from: &str) -> u64 {
        self.matrix.observation_count(from)
    }

    /// Whether a transition between the two states respects the phase
    /// order. False rather than an error for rejected transitions.
    pub fn validate_transition(&self, from: &WorkflowState, to: &WorkflowState) -> bool {
        self.phases.allows(&from.phase, &to.phase)
    }

    // --- Outcome log ---

    /// Append a prediction outcome for the historical-accuracy signal.
    pub fn record_outcome(&self, outcome: PredictionOutcome) {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        if outcomes.len() == defaults::DEFAULT_OUTCOME_LOG_CAPACITY {
            outcomes.pop_front();
        }
        outcomes.push_back(outcome);
    }

    /// Drop outcomes older than the retention window.
    pub fn prune_outcomes(&self, retention_days: u32) {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|o| o.timestamp >= cutoff);
    }

    pub fn outcome_count(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // --- Prediction ---

    /// Rank candidate next steps for `from` using only the machine's own
    /// statistics.
    pub fn predict_next_states(
        &self,
        from: &WorkflowState,
        max_predictions: usize,
    ) -> Vec<PredictedState> {
        self.predict_with_inputs(from, max_predictions, &ScoringInputs::default())
    }

    /// Rank candidate next steps with external evidence mixed in.
    ///
    /// Below the minimum-observation threshold the deterministic rule-based
    /// fallback answers instead; with no data at all the result is empty.
    pub fn predict_with_inputs(
        &self,
        from: &WorkflowState,
        max_predictions: usize,
        inputs: &ScoringInputs<'_>,
    ) -> Vec<PredictedState> {
        if max_predictions == 0 {
            return Vec::new();
        }

        let observed = self.matrix.observation_count(&from.current_step);
        if observed < self.config.min_observations {
            return fallback::predict(from, max_predictions);
        }

        let row = match self.matrix.row(&from.current_step) {
            Some(row) if !row.is_empty() => row,
            _ => return fallback::predict(from, max_predictions),
        };

        let now = Utc::now();
        let half_life = self.config.temporal_half_life_days;
        let historical = {
            let outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
            let ordered: Vec<PredictionOutcome> = outcomes.iter().cloned().collect();
            factors::historical_accuracy(&ordered, factors::default_accuracy_decay())
        };

        let profile_alignment = match (inputs.profile, inputs.requirement) {
            (Some(profile), Some(requirement)) => {
                factors::user_profile_alignment(profile, requirement)
            }
            _ => 0.5,
        };

        let mut predictions: Vec<PredictedState> = row
            .into_iter()
            .map(|(to, stat)| {
                let target_sequence = [from.current_step.clone(), to.clone()];
                // The transition's own record acts as an exact-match
                // two-step pattern: similarity 1.0 at its success rate.
                let external_strength =
                    factors::pattern_strength(&target_sequence, inputs.patterns, now, half_life);
                let pattern_component = external_strength.max(stat.success_rate());

                let context_component = match inputs.context {
                    Some(context) if !inputs.patterns.is_empty() => inputs
                        .patterns
                        .iter()
                        .map(|p| context_similarity(context, &p.context))
                        .fold(0.0, f64::max),
                    _ => 0.5,
                };

                let components = ConfidenceComponents {
                    historical_accuracy: historical,
                    pattern_strength: pattern_component,
                    context_similarity: context_component,
                    user_profile_alignment: profile_alignment,
                    temporal_relevance: factors::temporal_relevance(
                        stat.last_observed,
                        now,
                        half_life,
                    ),
                };

                let raw_confidence = self.scorer.score(&components);
                PredictedState {
                    id: Uuid::new_v4(),
                    step_id: to,
                    raw_probability: stat.probability,
                    calibrated_confidence: self.calibration.calibrate(raw_confidence),
                }
            })
            .collect();

        predictions.sort_by(|a, b| {
            b.calibrated_confidence
                .total_cmp(&a.calibrated_confidence)
                .then(b.raw_probability.total_cmp(&a.raw_probability))
                .then(a.step_id.cmp(&b.step_id))
        });
        predictions.truncate(max_predictions);
        predictions
    }

    // --- Persistence ---

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            version: SNAPSHOT_VERSION,
            current: self.current_state(),
            history: self
                .history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .to_vec(),
            matrix: self.matrix.export(),
            outcomes: self
                .outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .cloned()
                .collect(),
        }
    }

    fn apply_snapshot(&self, snapshot: StateSnapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot.current;
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .restore(snapshot.history);
        self.matrix.import(snapshot.matrix);
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        outcomes.clear();
        outcomes.extend(snapshot.outcomes);
    }

    /// Save a snapshot through the state store. Failures are logged and
    /// swallowed; the in-memory state stays authoritative.
    pub fn persist_state(&self) {
        let snapshot = self.snapshot();
        match snapshot.to_bytes() {
            Ok(bytes) => {
                if let Err(error) = self.store.save(&bytes) {
                    warn!(%error, "state persistence failed, in-memory state remains authoritative");
                }
            }
            Err(error) => warn!(%error, "state snapshot encoding failed"),
        }
    }

    /// Restore from the state store if a readable snapshot exists. Any
    /// failure leaves the in-memory state untouched.
    pub fn load_persisted_state(&self) {
        match self.store.load() {
            Ok(Some(bytes)) => match StateSnapshot::from_bytes(&bytes) {
                Ok(snapshot) => self.apply_snapshot(snapshot),
                Err(error) => warn!(%error, "persisted snapshot unreadable, keeping in-memory state"),
            },
            Ok(None) => {}
            Err(error) => warn!(%error, "state load failed, keeping in-memory state"),
        }
    }

    /// Clear all mutable state.
    pub fn reset(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.matrix.clear();
    }
}
