#![allow(dead_code)]

//! Shared test doubles for the engine integration suites.

use std::sync::Mutex;

use chrono::{Duration, Utc};

use augur_core::errors::{AugurError, AugurResult};
use augur_core::models::{Pattern, PatternKind, WorkflowContext, WorkflowState};
use augur_core::traits::{MetricEvent, MetricsSink, PatternRepository, StateStore};

/// Repository backed by a fixed pattern list.
pub struct StaticPatternRepository {
    patterns: Vec<Pattern>,
}

impl StaticPatternRepository {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl PatternRepository for StaticPatternRepository {
    fn query_patterns(&self, kind: PatternKind, _context: &WorkflowContext) -> Vec<Pattern> {
        self.patterns
            .iter()
            .filter(|p| p.kind == kind)
            .cloned()
            .collect()
    }
}

/// Sink that remembers every event for assertions.
#[derive(Default)]
pub struct RecordingMetricsSink {
    pub events: Mutex<Vec<MetricEvent>>,
}

impl MetricsSink for RecordingMetricsSink {
    fn record(&self, event: MetricEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Store keeping the last saved blob in memory.
#[derive(Default)]
pub struct InMemoryStateStore {
    blob: Mutex<Option<Vec<u8>>>,
}

impl StateStore for InMemoryStateStore {
    fn save(&self, blob: &[u8]) -> AugurResult<()> {
        *self.blob.lock().unwrap() = Some(blob.to_vec());
        Ok(())
    }

    fn load(&self) -> AugurResult<Option<Vec<u8>>> {
        Ok(self.blob.lock().unwrap().clone())
    }
}

/// Store whose every operation fails.
pub struct FailingStateStore;

impl StateStore for FailingStateStore {
    fn save(&self, _blob: &[u8]) -> AugurResult<()> {
        Err(AugurError::Persistence {
            reason: "disk unavailable".into(),
        })
    }

    fn load(&self) -> AugurResult<Option<Vec<u8>>> {
        Err(AugurError::Persistence {
            reason: "disk unavailable".into(),
        })
    }
}

pub fn state(phase: &str, step: &str, document_type: &str) -> WorkflowState {
    WorkflowState::new(phase, step, document_type)
}

/// A workflow-sequence pattern observed `age_days` ago.
pub fn sequence_pattern(steps: &[&str], document_type: &str, success_rate: f64, age_days: i64) -> Pattern {
    Pattern {
        kind: PatternKind::WorkflowSequence,
        sequence: steps.iter().map(|s| s.to_string()).collect(),
        context: WorkflowContext::new(document_type),
        frequency: 1,
        success_rate,
        last_observed_at: Utc::now() - Duration::days(age_days),
    }
}

/// A pattern of a kind the engine must filter out.
pub fn field_values_pattern(document_type: &str) -> Pattern {
    Pattern {
        kind: PatternKind::FieldValues,
        sequence: vec!["vendor_name".into(), "contract_value".into()],
        context: WorkflowContext::new(document_type),
        frequency: 5,
        success_rate: 1.0,
        last_observed_at: Utc::now(),
    }
}
