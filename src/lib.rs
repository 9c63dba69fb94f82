//! Cohort Engine - rating normalization and cohort autopick for chess students
//!
//! This crate keeps a student's ratings from several providers up to date,
//! places the student into a training cohort from the preferred rating, and
//! ranks ratings against the population for periodic progress reports.

pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod rating;
pub mod stats;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{EngineError, EngineResult, FetchError, ProviderFailure, Result};
pub use types::*;

// Re-export key components
pub use cohort::CohortResolver;
pub use engine::{AutopickReport, CohortEngine, EngineDeps, UpdateReport};
pub use provider::{ProviderRegistry, RatingProvider, StaticRatingProvider};
pub use store::{InMemoryStudentStore, PopulationSource, StudentStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
