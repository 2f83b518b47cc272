//! # augur-scoring
//!
//! Multi-factor confidence scoring: five independent signals (historical
//! accuracy, pattern strength, context similarity, profile alignment,
//! temporal relevance) combined under tunable weights, calibrated by Platt
//! scaling, validated by Brier score with a guarded recalibration swap.
//!
//! Every function here is a pure computation over its inputs; candidates may
//! be scored concurrently without synchronization. The only shared state is
//! the [`CalibrationStore`], which publishes the active calibrator behind a
//! read lock.

pub mod calibration;
pub mod factors;
pub mod scorer;
pub mod similarity;

pub use calibration::{
    brier_score, reliability_diagram, CalibrationBin, CalibrationSample, CalibrationStore,
    PlattCalibrator, RecalibrationReport, ReliabilityDiagram,
};
pub use scorer::{
    clamp_confidence, confidence_variance, ComponentWeights, ConfidenceCategory, ConfidenceScorer,
};
