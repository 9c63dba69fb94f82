//! Rating staleness and reconciliation
//!
//! This module decides which provider ratings must be fetched again and merges
//! fetched values into a student's stored rating set, preserving history.

pub mod reconciler;
pub mod staleness;

// Re-export commonly used types
pub use reconciler::{RatingReconciler, ReconcileOutcome, ReconcilePolicy};
pub use staleness::needs_refresh;
