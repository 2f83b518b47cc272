//! Phase-order validation for workflow transitions.

use std::collections::HashMap;

use augur_core::config::EngineConfig;

/// Ordered phase table plus the whitelist of revision loops that may move
/// backwards (e.g. evaluation reopening the solicitation for an amendment).
#[derive(Debug, Clone)]
pub struct PhaseTable {
    order: HashMap<String, usize>,
    revision_loops: Vec<(String, String)>,
}

impl PhaseTable {
    pub fn from_config(config: &EngineConfig) -> Self {
        let order = config
            .phase_order
            .iter()
            .enumerate()
            .map(|(index, phase)| (phase.clone(), index))
            .collect();
        Self {
            order,
            revision_loops: config.revision_loops.clone(),
        }
    }

    /// Whether a transition between phases is allowed.
    ///
    /// Moving forward or staying in place is always allowed. Moving to an
    /// earlier phase is rejected unless whitelisted. Phases absent from the
    /// table are allowed; there is no basis to reject them.
    pub fn allows(&self, from_phase: &str, to_phase: &str) -> bool {
        let (Some(&from_rank), Some(&to_rank)) =
            (self.order.get(from_phase), self.order.get(to_phase))
        else {
            return true;
        };

        if to_rank >= from_rank {
            return true;
        }

        self.revision_loops
            .iter()
            .any(|(from, to)| from == from_phase && to == to_phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PhaseTable {
        PhaseTable::from_config(&EngineConfig::default())
    }

    #[test]
    fn forward_and_same_phase_allowed() {
        let table = table();
        assert!(table.allows("planning", "solicitation"));
        assert!(table.allows("planning", "closeout"));
        assert!(table.allows("evaluation", "evaluation"));
    }

    #[test]
    fn backward_rejected() {
        let table = table();
        assert!(!table.allows("award", "planning"));
        assert!(!table.allows("administration", "evaluation"));
    }

    #[test]
    fn whitelisted_revision_loops_allowed() {
        let table = table();
        assert!(table.allows("evaluation", "solicitation"));
        assert!(table.allows("closeout", "administration"));
        // The whitelist is directional.
        assert!(!table.allows("award", "solicitation"));
    }

    #[test]
    fn unknown_phases_are_not_rejected() {
        let table = table();
        assert!(table.allows("unknown", "planning"));
        assert!(table.allows("award", "unknown"));
    }
}
