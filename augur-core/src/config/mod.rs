pub mod defaults;
pub mod engine_config;
pub mod feature_flags;
pub mod privacy_settings;

pub use engine_config::EngineConfig;
pub use feature_flags::FeatureFlags;
pub use privacy_settings::PrivacySettings;
