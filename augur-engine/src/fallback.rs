//! Deterministic rule-based predictor, used until enough transitions have
//! been observed from a step for Markov ranking to take over.
//!
//! The rules encode the canonical federal-procurement step order. Outputs
//! are a pure function of the input state: repeated calls with an identical
//! state produce identical step ids, probabilities, and confidences.

use augur_core::models::{PredictedState, WorkflowState};
use uuid::Uuid;

/// Confidence assigned to the first rule candidate; each later candidate
/// steps down by `CONFIDENCE_STEP`.
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_STEP: f64 = 0.1;

/// Step-specific rules take priority over the per-phase defaults.
fn step_rules(current_step: &str) -> Option<&'static [&'static str]> {
    Some(match current_step {
        "requirements_gathering" => &["vendor_research", "draft_specifications"],
        "market_research" => &["requirements_gathering", "acquisition_planning"],
        "evaluation_criteria" => &["technical_review", "cost_analysis"],
        "technical_review" => &["past_performance_review", "competitive_range"],
        "winner_selection" => &["contract_award_notice", "debriefing"],
        "final_documentation" => &["archive_records", "lessons_learned"],
        _ => return None,
    })
}

fn phase_rules(phase: &str) -> Option<&'static [&'static str]> {
    Some(match phase {
        "planning" => &["requirements_gathering", "market_research"],
        "solicitation" => &["qa_period", "proposal_receipt"],
        "evaluation" => &["technical_review", "cost_analysis"],
        "award" => &["contract_award_notice", "debriefing"],
        "administration" => &["invoice_processing", "milestone_review"],
        "closeout" => &["final_documentation", "archive_records"],
        _ => return None,
    })
}

/// Predict next steps from the rule table. Empty when neither the step nor
/// the phase has a rule: no data at all means no predictions, not a guess.
pub fn predict(state: &WorkflowState, max_predictions: usize) -> Vec<PredictedState> {
    let steps = step_rules(&state.current_step)
        .or_else(|| phase_rules(&state.phase))
        .unwrap_or(&[]);

    steps
        .iter()
        .filter(|step| **step != state.current_step)
        .take(max_predictions)
        .enumerate()
        .map(|(rank, step)| {
            let confidence = (BASE_CONFIDENCE - rank as f64 * CONFIDENCE_STEP).max(0.05);
            PredictedState {
                id: Uuid::new_v4(),
                step_id: (*step).to_string(),
                raw_probability: confidence,
                calibrated_confidence: confidence,
            }
        })
        .collect()
}
