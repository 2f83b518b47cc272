pub mod components;
pub mod context;
pub mod feedback;
pub mod pattern;
pub mod prediction;
pub mod profile;
pub mod workflow_state;

pub use components::ConfidenceComponents;
pub use context::WorkflowContext;
pub use feedback::{PredictionFeedback, UserAction};
pub use pattern::{Pattern, PatternKind};
pub use prediction::{PredictedState, PredictionOutcome};
pub use profile::{ExpertiseLevel, ExpertiseRequirement, UserProfile};
pub use workflow_state::WorkflowState;
