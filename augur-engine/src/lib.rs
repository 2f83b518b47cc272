//! # augur-engine
//!
//! The predictive workflow engine: a probabilistic state machine over
//! learned transition probabilities ([`WorkflowStateMachine`]) wrapped by
//! the governance and feedback orchestration layer
//! ([`PatternLearningEngine`]).
//!
//! The state machine is the single owner of all mutable prediction state
//! (current workflow state, transition matrix, bounded history), and every
//! mutation is serialized through its narrow API. Confidence scoring runs as
//! pure computation per candidate; calibration state lives in the shared
//! [`augur_scoring::CalibrationStore`] and is refreshed by the cancellable
//! [`RecalibrationScheduler`].

pub mod audit;
pub mod engine;
pub mod fallback;
pub mod history;
pub mod machine;
pub mod matrix;
pub mod phases;
pub mod recalibration;
pub mod snapshot;

pub use engine::PatternLearningEngine;
pub use machine::{ScoringInputs, WorkflowStateMachine};
pub use recalibration::RecalibrationScheduler;
