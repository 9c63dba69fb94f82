//! Cohort bands, threshold tables and the cohort resolver
//!
//! This module converts ratings on heterogeneous scales into cohort bands and
//! into each other's scales.

pub mod normalize;
pub mod resolver;
pub mod table;

// Re-export commonly used types
pub use resolver::CohortResolver;
pub use table::{Threshold, ThresholdTable};
