//! Engine operations over student records
//!
//! This module exposes the rating update, cohort autopick, manual cohort
//! selection and progress report operations.

pub mod operations;
pub mod outcome;

// Re-export commonly used types
pub use operations::{CohortEngine, EngineDeps};
pub use outcome::{AutopickReport, UpdateReport};
