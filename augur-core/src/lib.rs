//! # augur-core
//!
//! Core types, traits, errors, and configuration for the Augur workflow
//! prediction engine: workflow states, pattern records, prediction and
//! feedback values, privacy/feature snapshots, and the collaborator seams
//! (pattern repository, metrics sink, state store).

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use errors::{AugurError, AugurResult};
