//! Results returned by engine operations

use crate::error::{EngineError, EngineResult, ProviderFailure};
use crate::types::{CohortBand, Rating, RatingSystem, Student};
use serde::Serialize;
use uuid::Uuid;

/// Result of a general rating update.
///
/// The merged student has already been saved. Tolerated provider failures are
/// carried alongside it so the caller decides what to surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub update_id: Uuid,
    pub student: Student,
    pub refreshed: Vec<RatingSystem>,
    pub failures: Vec<ProviderFailure>,
}

impl UpdateReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The saved student, or [`EngineError::PartialMerge`] if any fetch failed
    pub fn into_result(self) -> EngineResult<Student> {
        if self.failures.is_empty() {
            Ok(self.student)
        } else {
            Err(EngineError::PartialMerge {
                student: Box::new(self.student),
                failures: self.failures,
            })
        }
    }
}

/// Result of a cohort autopick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopickReport {
    pub update_id: Uuid,
    pub student: Student,
    pub cohort: CohortBand,
    /// Preferred-system rating the cohort was chosen from
    pub source_rating: Rating,
    /// Failures on non-preferred systems
    pub tolerated_failures: Vec<ProviderFailure>,
}
