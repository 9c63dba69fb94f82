//! Statistics for periodic progress reports
//!
//! This module ranks rating values against a population snapshot and builds
//! per-student progress reports for a period.

pub mod percentile;
pub mod report;

// Re-export commonly used types
pub use percentile::{compute_stats, percentile};
pub use report::{PeriodRatings, ProgressReport, RatingReview, ReportBuilder, ReportPeriod};
