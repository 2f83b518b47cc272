//! Bounded FIFO history of observed workflow states.

use std::collections::VecDeque;

use augur_core::models::WorkflowState;

/// Fixed-capacity buffer; inserting beyond capacity silently evicts the
/// oldest entry. Insertion order defines recency for decay-weighted
/// calculations.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<WorkflowState>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1_024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, state: WorkflowState) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(state);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest entry still retained.
    pub fn oldest(&self) -> Option<&WorkflowState> {
        self.entries.front()
    }

    pub fn newest(&self) -> Option<&WorkflowState> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowState> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drain into a plain vector, oldest first, for snapshot persistence.
    pub fn to_vec(&self) -> Vec<WorkflowState> {
        self.entries.iter().cloned().collect()
    }

    pub fn restore(&mut self, states: Vec<WorkflowState>) {
        self.entries.clear();
        for state in states {
            self.push(state);
        }
    }
}
