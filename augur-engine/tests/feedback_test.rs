//! Feedback-loop integration tests: EMA reinforcement, corrections,
//! ordered accumulation, and calibration sampling.

mod common;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use augur_core::config::PrivacySettings;
use augur_core::models::{PredictionFeedback, UserAction};
use augur_engine::PatternLearningEngine;

use common::{state, StaticPatternRepository};

fn engine() -> PatternLearningEngine {
    PatternLearningEngine::with_repository(Arc::new(StaticPatternRepository::empty()))
}

/// Seed enough observations from `from` that the Markov path answers, then
/// serve predictions and return the id for `target`.
fn serve_prediction(engine: &PatternLearningEngine, from: &str, target: &str) -> Uuid {
    let machine = engine.state_machine();
    let now = Utc::now();
    for _ in 0..6 {
        machine.observe_transition(from, target, true, now);
    }
    for _ in 0..3 {
        machine.observe_transition(from, "alternative_step", true, now);
    }

    let predictions = engine
        .predict_workflow_sequence(&state("evaluation", from, "RFP"), 0.0)
        .unwrap();
    predictions
        .iter()
        .find(|p| p.step_id == target)
        .expect("target step predicted")
        .id
}

#[test]
fn rejected_feedback_strictly_decreases_the_transition_probability() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    let machine = engine.state_machine();

    let before = machine.transition_probability("technical_review", "competitive_range");
    let delta = engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Rejected,
        "cost_analysis",
        0.85,
    ));
    let after = machine.transition_probability("technical_review", "competitive_range");

    assert!(after < before, "expected decrease, got {before} -> {after}");
    assert!(delta < 0.0, "rejection must report a negative adjustment");
}

#[test]
fn accepted_feedback_reinforces_the_transition_probability() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    let machine = engine.state_machine();

    let before = machine.transition_probability("technical_review", "competitive_range");
    let delta = engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Accepted,
        "competitive_range",
        0.85,
    ));
    let after = machine.transition_probability("technical_review", "competitive_range");

    assert!(after > before, "expected increase, got {before} -> {after}");
    assert!(delta > 0.0);
}

#[test]
fn modified_feedback_records_the_corrected_step() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    let machine = engine.state_machine();

    assert_eq!(
        machine.transition_probability("technical_review", "past_performance_review"),
        0.0
    );
    engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Modified,
        "past_performance_review",
        0.6,
    ));

    assert!(
        machine.transition_probability("technical_review", "past_performance_review") > 0.0,
        "corrected step must enter the matrix"
    );
}

/// Feedback events referencing the same prediction id accumulate as
/// sequential EMA updates rather than overwriting each other.
#[test]
fn repeated_feedback_on_one_prediction_accumulates() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    let machine = engine.state_machine();

    let p0 = machine.transition_probability("technical_review", "competitive_range");
    engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Rejected,
        "cost_analysis",
        0.8,
    ));
    let p1 = machine.transition_probability("technical_review", "competitive_range");
    engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Rejected,
        "cost_analysis",
        0.8,
    ));
    let p2 = machine.transition_probability("technical_review", "competitive_range");

    assert!(p2 < p1 && p1 < p0, "each event compounds: {p0} -> {p1} -> {p2}");
}

#[test]
fn concurrent_feedback_applies_every_event() {
    use std::thread;

    let engine = Arc::new(engine());
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    let machine = engine.state_machine();
    let before = machine.transition_probability("technical_review", "competitive_range");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine.process_prediction_feedback(PredictionFeedback::new(
                    prediction_id,
                    UserAction::Rejected,
                    "cost_analysis",
                    0.8,
                ));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Four sequential EMA steps with alpha = 0.3.
    let expected = before * 0.7f64.powi(4);
    let after = machine.transition_probability("technical_review", "competitive_range");
    assert!(
        (after - expected).abs() < 1e-6,
        "expected {expected}, got {after}"
    );
}

#[test]
fn unknown_prediction_id_is_a_no_op() {
    let engine = engine();
    serve_prediction(&engine, "technical_review", "competitive_range");
    let machine = engine.state_machine();
    let before = machine.transition_probability("technical_review", "competitive_range");

    let delta = engine.process_prediction_feedback(PredictionFeedback::new(
        Uuid::new_v4(),
        UserAction::Accepted,
        "competitive_range",
        0.9,
    ));

    assert_eq!(delta, 0.0);
    assert_eq!(
        machine.transition_probability("technical_review", "competitive_range"),
        before
    );
}

#[test]
fn privacy_disabled_blocks_feedback_processing() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    engine.update_privacy_settings(PrivacySettings {
        enable_predictions: false,
        data_retention_days: 30,
        allow_analytics: false,
    });

    let delta = engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Accepted,
        "competitive_range",
        0.9,
    ));
    assert_eq!(delta, 0.0);
}

#[test]
fn feedback_feeds_the_calibration_window() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");
    assert_eq!(engine.calibration().sample_count(), 0);

    engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Accepted,
        "competitive_range",
        0.85,
    ));
    assert_eq!(engine.calibration().sample_count(), 1);
}

#[test]
fn accuracy_tracker_moves_with_feedback_direction() {
    let engine = engine();
    let prediction_id = serve_prediction(&engine, "technical_review", "competitive_range");

    let baseline = engine.accuracy();
    engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Accepted,
        "competitive_range",
        0.85,
    ));
    assert!(engine.accuracy() > baseline);

    engine.process_prediction_feedback(PredictionFeedback::new(
        prediction_id,
        UserAction::Rejected,
        "cost_analysis",
        0.85,
    ));
    assert!(engine.accuracy() < baseline + 0.3 * (1.0 - baseline) + 1e-9);
}
