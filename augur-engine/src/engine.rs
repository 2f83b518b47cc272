//! Pattern learning engine: the public entry point.
//!
//! Applies privacy/feature gating before any computation, filters the
//! external pattern corpus down to relevant workflow-sequence patterns,
//! delegates ranking to the state machine, and closes the loop by folding
//! user feedback into the transition matrix, the accuracy tracker, and the
//! calibration sample window.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use uuid::Uuid;

use augur_core::config::{defaults, EngineConfig, FeatureFlags, PrivacySettings};
use augur_core::errors::{AugurError, AugurResult};
use augur_core::models::{
    ExpertiseLevel, ExpertiseRequirement, Pattern, PatternKind, PredictedState,
    PredictionFeedback, PredictionOutcome, UserAction, UserProfile, WorkflowContext,
    WorkflowState,
};
use augur_core::traits::{MetricEvent, MetricsSink, NullMetricsSink, PatternRepository};
use augur_scoring::calibration::{CalibrationSample, CalibrationStore};
use augur_scoring::factors::temporal_relevance;
use augur_scoring::{ConfidenceCategory, ConfidenceScorer};

use crate::audit::{AuditEntry, AuditLog};
use crate::machine::{ScoringInputs, WorkflowStateMachine};
use crate::recalibration::RecalibrationScheduler;

/// Patterns kept per prediction after relevance weighting.
const MAX_SCORED_PATTERNS: usize = 64;

/// What a served prediction was about, kept so later feedback can resolve
/// the transition it refers to.
#[derive(Debug, Clone)]
struct PredictionRecord {
    from_step: String,
    predicted_step: String,
}

/// Bounded id → record book, FIFO eviction.
#[derive(Debug, Default)]
struct RecordBook {
    order: VecDeque<Uuid>,
    records: HashMap<Uuid, PredictionRecord>,
}

impl RecordBook {
    fn insert(&mut self, id: Uuid, record: PredictionRecord) {
        if self.order.len() == defaults::DEFAULT_PREDICTION_RECORD_CAPACITY {
            if let Some(evicted) = self.order.pop_front() {
                self.records.remove(&evicted);
            }
        }
        self.order.push_back(id);
        self.records.insert(id, record);
    }

    fn get(&self, id: &Uuid) -> Option<PredictionRecord> {
        self.records.get(id).cloned()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.records.clear();
    }
}

/// Accuracy tracker mutated only under the feedback lock, so feedback for
/// the same prediction id accumulates in arrival order.
#[derive(Debug)]
struct FeedbackState {
    accuracy: f64,
}

pub struct PatternLearningEngine {
    config: EngineConfig,
    machine: Arc<WorkflowStateMachine>,
    calibration: Arc<CalibrationStore>,
    repository: Arc<dyn PatternRepository>,
    metrics: Arc<dyn MetricsSink>,
    privacy: RwLock<PrivacySettings>,
    flags: RwLock<FeatureFlags>,
    profile: RwLock<Option<UserProfile>>,
    audit: AuditLog,
    records: Mutex<RecordBook>,
    feedback: Mutex<FeedbackState>,
}

impl PatternLearningEngine {
    /// Build the engine from its collaborators. Constructed once by the
    /// composition root and passed by handle; there is no shared global
    /// instance.
    pub fn new(
        config: EngineConfig,
        machine: Arc<WorkflowStateMachine>,
        calibration: Arc<CalibrationStore>,
        repository: Arc<dyn PatternRepository>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            config,
            machine,
            calibration,
            repository,
            metrics,
            privacy: RwLock::new(PrivacySettings::default()),
            flags: RwLock::new(FeatureFlags::default()),
            profile: RwLock::new(None),
            audit: AuditLog::default(),
            records: Mutex::new(RecordBook::default()),
            feedback: Mutex::new(FeedbackState { accuracy: 0.5 }),
        }
    }

    /// Engine with default config and a silent metrics sink, sharing one
    /// calibration store between machine and feedback loop.
    pub fn with_repository(repository: Arc<dyn PatternRepository>) -> Self {
        let config = EngineConfig::default();
        let calibration = Arc::new(CalibrationStore::new(
            defaults::DEFAULT_CALIBRATION_SAMPLE_CAPACITY,
            config.min_calibration_samples,
            defaults::DEFAULT_CALIBRATION_FOLDS,
        ));
        let machine = Arc::new(WorkflowStateMachine::new(
            config.clone(),
            Arc::clone(&calibration),
            Arc::new(augur_core::traits::NullStateStore),
        ));
        Self::new(config, machine, calibration, repository, Arc::new(NullMetricsSink))
    }

    pub fn state_machine(&self) -> &WorkflowStateMachine {
        &self.machine
    }

    pub fn calibration(&self) -> &Arc<CalibrationStore> {
        &self.calibration
    }

    // --- Prediction ---

    /// Predict the workflow's next steps, gated by privacy and feature
    /// configuration and filtered to `confidence_threshold`.
    ///
    /// No-data conditions (gates closed, nothing relevant) come back as an
    /// empty `Ok`; only invalid configuration is an error.
    pub fn predict_workflow_sequence(
        &self,
        state: &WorkflowState,
        confidence_threshold: f64,
    ) -> AugurResult<Vec<PredictedState>> {
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(AugurError::ThresholdOutOfRange {
                value: confidence_threshold,
            });
        }

        let privacy = self.privacy_snapshot();
        if !privacy.enable_predictions {
            self.audit.record(
                "predict_workflow_sequence",
                "predictions disabled by privacy settings, returning empty",
            );
            return Ok(Vec::new());
        }

        let flags = self.flags_snapshot();
        if !flags.enable_predictions {
            self.audit.record(
                "predict_workflow_sequence",
                "predictions disabled by feature flag, returning empty",
            );
            return Ok(Vec::new());
        }
        if flags.max_predictions == 0 {
            return Err(AugurError::InvalidPredictionLimit);
        }

        let context = WorkflowContext::from_state(state);
        let patterns = self.relevant_patterns(state, &context);

        let profile = self
            .profile
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let requirement = profile.as_ref().map(|_| derive_requirement(state));

        let inputs = ScoringInputs {
            patterns: &patterns,
            context: Some(&context),
            profile: profile.as_ref(),
            requirement: requirement.as_ref(),
        };
        let mut predictions =
            self.machine
                .predict_with_inputs(state, flags.max_predictions, &inputs);
        predictions.retain(|p| p.calibrated_confidence >= confidence_threshold);

        self.remember_predictions(&state.current_step, &predictions);
        self.audit.record(
            "predict_workflow_sequence",
            format!(
                "served {} predictions at threshold {confidence_threshold:.2}",
                predictions.len()
            ),
        );
        if privacy.allow_analytics {
            self.metrics.record(MetricEvent::PredictionServed {
                candidate_count: predictions.len(),
                confidence_threshold,
            });
        }

        Ok(predictions)
    }

    /// Rank next steps straight from the state machine, without pattern
    /// evidence or threshold filtering.
    pub fn predict_next_states(
        &self,
        from: &WorkflowState,
        max_predictions: usize,
    ) -> AugurResult<Vec<PredictedState>> {
        if max_predictions == 0 {
            return Err(AugurError::InvalidPredictionLimit);
        }
        let predictions = self.machine.predict_next_states(from, max_predictions);
        self.remember_predictions(&from.current_step, &predictions);
        Ok(predictions)
    }

    // --- Feedback ---

    /// Fold user feedback into the transition matrix, the accuracy tracker,
    /// and the calibration window. Returns the signed accuracy adjustment.
    ///
    /// Held under the feedback lock for its whole body: feedback events for
    /// the same prediction id accumulate as sequential EMA updates in
    /// arrival order rather than overwriting each other.
    pub fn process_prediction_feedback(&self, feedback: PredictionFeedback) -> f64 {
        let privacy = self.privacy_snapshot();
        if !privacy.enable_predictions {
            self.audit.record(
                "process_prediction_feedback",
                "feedback processing disabled by privacy settings",
            );
            return 0.0;
        }

        let mut tracker = self.feedback.lock().unwrap_or_else(PoisonError::into_inner);

        let record = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&feedback.prediction_id);
        let Some(record) = record else {
            self.audit.record(
                "process_prediction_feedback",
                "feedback referenced an unknown prediction id",
            );
            return 0.0;
        };

        let alpha = self.config.ema_alpha;
        let accepted = feedback.user_action == UserAction::Accepted;

        match feedback.user_action {
            UserAction::Accepted => {
                let p = self
                    .machine
                    .transition_probability(&record.from_step, &record.predicted_step);
                self.machine.update_transition_probability(
                    &record.from_step,
                    &record.predicted_step,
                    p + alpha * (1.0 - p),
                );
                self.machine.record_outcome(PredictionOutcome::new(
                    record.predicted_step.clone(),
                    record.predicted_step.clone(),
                    true,
                ));
            }
            UserAction::Rejected => {
                let p = self
                    .machine
                    .transition_probability(&record.from_step, &record.predicted_step);
                self.machine.update_transition_probability(
                    &record.from_step,
                    &record.predicted_step,
                    p + alpha * (0.0 - p),
                );
                self.machine.record_outcome(PredictionOutcome::new(
                    record.predicted_step.clone(),
                    feedback.actual_next_step.clone(),
                    false,
                ));
            }
            UserAction::Modified => {
                // The correction is a real observation of the actual
                // transition, then the mispredicted step decays.
                self.machine.observe_transition(
                    &record.from_step,
                    &feedback.actual_next_step,
                    true,
                    feedback.timestamp,
                );
                let p = self
                    .machine
                    .transition_probability(&record.from_step, &record.predicted_step);
                self.machine.update_transition_probability(
                    &record.from_step,
                    &record.predicted_step,
                    p + alpha * (0.0 - p),
                );
                self.machine.record_outcome(PredictionOutcome::new(
                    record.predicted_step.clone(),
                    feedback.actual_next_step.clone(),
                    false,
                ));
            }
        }

        let target = if accepted { 1.0 } else { 0.0 };
        let previous = tracker.accuracy;
        tracker.accuracy = previous + alpha * (target - previous);
        let delta = tracker.accuracy - previous;

        self.calibration
            .push_sample(CalibrationSample::new(feedback.observed_confidence, accepted));
        self.machine.prune_outcomes(privacy.data_retention_days);

        self.audit.record(
            "process_prediction_feedback",
            format!(
                "processed {:?} feedback, accuracy adjustment {delta:+.4}",
                feedback.user_action
            ),
        );
        if privacy.allow_analytics {
            self.metrics.record(MetricEvent::FeedbackProcessed {
                action: action_label(feedback.user_action).to_string(),
                accuracy_delta: delta,
            });
        }

        delta
    }

    /// Bucket a calibrated confidence per the configured thresholds.
    pub fn categorize_confidence(&self, score: f64) -> ConfidenceCategory {
        ConfidenceScorer::categorize(
            score,
            self.config.low_confidence_threshold,
            self.config.high_confidence_threshold,
        )
    }

    /// Spawn the periodic recalibration task on the current tokio runtime,
    /// at the configured interval.
    pub fn spawn_recalibration(&self) -> RecalibrationScheduler {
        RecalibrationScheduler::spawn(
            Arc::clone(&self.calibration),
            Arc::clone(&self.metrics),
            std::time::Duration::from_secs(self.config.recalibration_interval_secs),
        )
    }

    /// Recency-weighted running accuracy of served predictions.
    pub fn accuracy(&self) -> f64 {
        self.feedback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accuracy
    }

    // --- Configuration ---

    /// Replace the cached privacy snapshot; takes effect on the next call.
    /// Shrinking the retention window prunes aged data immediately, and
    /// disabling predictions clears all prediction data.
    pub fn update_privacy_settings(&self, settings: PrivacySettings) {
        let previous = {
            let mut privacy = self.privacy.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *privacy, settings.clone())
        };

        self.audit.record(
            "update_privacy_settings",
            format!(
                "predictions={}, retention={}d, analytics={}",
                settings.enable_predictions, settings.data_retention_days, settings.allow_analytics
            ),
        );

        if settings.data_retention_days < previous.data_retention_days {
            self.machine.prune_outcomes(settings.data_retention_days);
            self.calibration
                .prune_older_than(settings.data_retention_days);
            self.audit.prune_older_than(settings.data_retention_days);
        }

        if !settings.enable_predictions && previous.enable_predictions {
            self.clear_prediction_data();
        }
    }

    pub fn update_feature_flags(&self, flags: FeatureFlags) {
        self.audit.record(
            "update_feature_flags",
            format!(
                "predictions={}, auto_execution={}, max_predictions={}",
                flags.enable_predictions, flags.enable_auto_execution, flags.max_predictions
            ),
        );
        *self.flags.write().unwrap_or_else(PoisonError::into_inner) = flags;
    }

    pub fn set_user_profile(&self, profile: Option<UserProfile>) {
        self.audit.record(
            "set_user_profile",
            if profile.is_some() {
                "profile attached"
            } else {
                "profile cleared"
            },
        );
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = profile;
    }

    /// Full privacy-compliant reset: prediction data, calibration samples,
    /// configuration, and the audit trail itself.
    pub fn reset(&self) {
        self.clear_prediction_data();
        *self.privacy.write().unwrap_or_else(PoisonError::into_inner) =
            PrivacySettings::default();
        *self.flags.write().unwrap_or_else(PoisonError::into_inner) = FeatureFlags::default();
        *self.profile.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.feedback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accuracy = 0.5;
        self.audit.clear();
        self.audit.record("reset", "engine reset completed");
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.recent()
    }

    // --- Internals ---

    fn privacy_snapshot(&self) -> PrivacySettings {
        self.privacy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn flags_snapshot(&self) -> FeatureFlags {
        self.flags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Workflow-sequence patterns relevant to the state, strongest
    /// recency/success weight first, capped to keep scoring cheap.
    fn relevant_patterns(&self, state: &WorkflowState, context: &WorkflowContext) -> Vec<Pattern> {
        let now = Utc::now();
        let half_life = self.config.temporal_half_life_days;

        let mut weighted: Vec<(f64, Pattern)> = self
            .repository
            .query_patterns(PatternKind::WorkflowSequence, context)
            .into_iter()
            .filter(|p| {
                p.kind == PatternKind::WorkflowSequence
                    && p.is_relevant_to(&state.document_type, &state.current_step)
            })
            .map(|p| {
                let weight = p.success_rate.clamp(0.0, 1.0)
                    * temporal_relevance(p.last_observed_at, now, half_life);
                (weight, p)
            })
            .filter(|(weight, _)| *weight > f64::EPSILON)
            .collect();

        weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
        weighted.truncate(MAX_SCORED_PATTERNS);
        weighted.into_iter().map(|(_, p)| p).collect()
    }

    fn remember_predictions(&self, from_step: &str, predictions: &[PredictedState]) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        for prediction in predictions {
            records.insert(
                prediction.id,
                PredictionRecord {
                    from_step: from_step.to_string(),
                    predicted_step: prediction.step_id.clone(),
                },
            );
        }
    }

    fn clear_prediction_data(&self) {
        self.machine.reset();
        self.calibration.clear_samples();
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.audit.record("clear_prediction_data", "prediction data cleared");
    }
}

/// Expertise a state demands, derived from its metadata: the "domain" key
/// names the knowledge area, the complexity label maps to a required level.
fn derive_requirement(state: &WorkflowState) -> ExpertiseRequirement {
    let domain = state
        .metadata
        .get("domain")
        .cloned()
        .unwrap_or_else(|| state.document_type.clone());
    let required = match state.metadata.get("complexity").map(String::as_str) {
        Some("high") => ExpertiseLevel::Advanced,
        Some("low") => ExpertiseLevel::Low,
        _ => ExpertiseLevel::Intermediate,
    };
    ExpertiseRequirement { domain, required }
}

fn action_label(action: UserAction) -> &'static str {
    match action {
        UserAction::Accepted => "accepted",
        UserAction::Rejected => "rejected",
        UserAction::Modified => "modified",
    }
}
