use crate::models::{Pattern, PatternKind, WorkflowContext};

/// Read-only access to the externally owned pattern corpus.
pub trait PatternRepository: Send + Sync {
    /// Patterns of `kind` relevant to `context`. Relevance filtering beyond
    /// the kind tag is advisory; the engine re-filters what it receives.
    fn query_patterns(&self, kind: PatternKind, context: &WorkflowContext) -> Vec<Pattern>;
}
