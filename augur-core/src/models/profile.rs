use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordinal expertise scale used for profile alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpertiseLevel {
    Novice,
    Low,
    Intermediate,
    High,
    Advanced,
    Expert,
}

impl ExpertiseLevel {
    /// Position on the ordinal scale, 0 = novice.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// The user's acquisition expertise profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Overall acquisition experience.
    pub experience: ExpertiseLevel,
    /// Per-domain knowledge levels (e.g. "IT" → advanced).
    #[serde(default)]
    pub domain_knowledge: BTreeMap<String, ExpertiseLevel>,
    /// Historical fraction of successfully completed workflows, in [0, 1].
    pub success_history: f64,
}

impl UserProfile {
    /// Expertise in `domain`, falling back to overall experience when the
    /// domain is unknown.
    pub fn level_for(&self, domain: &str) -> ExpertiseLevel {
        self.domain_knowledge
            .get(domain)
            .copied()
            .unwrap_or(self.experience)
    }
}

/// Expertise a workflow step demands, used as the comparison target for
/// profile alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertiseRequirement {
    pub domain: String,
    pub required: ExpertiseLevel,
}
