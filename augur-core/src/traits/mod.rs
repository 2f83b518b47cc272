pub mod metrics_sink;
pub mod pattern_repository;
pub mod state_store;

pub use metrics_sink::{MetricEvent, MetricsSink, NullMetricsSink};
pub use pattern_repository::PatternRepository;
pub use state_store::{NullStateStore, StateStore};
