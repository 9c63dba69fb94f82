//! Cohort resolution from per-system threshold tables
//!
//! The resolver is pure configuration plus lookups: it never performs I/O and
//! is shared read-only by every request for the lifetime of the process.

use crate::cohort::table::ThresholdTable;
use crate::error::{EngineError, EngineResult};
use crate::types::{CohortBand, Rating, RatingSystem};
use std::collections::BTreeMap;
use tracing::debug;

/// Maps ratings on calibrated systems to cohort bands
#[derive(Debug, Clone, Default)]
pub struct CohortResolver {
    tables: BTreeMap<RatingSystem, ThresholdTable>,
}

impl CohortResolver {
    /// Create a resolver from per-system tables.
    ///
    /// The custom system has no calibration and cannot carry a table.
    pub fn new(tables: BTreeMap<RatingSystem, ThresholdTable>) -> EngineResult<Self> {
        if tables.contains_key(&RatingSystem::Custom) {
            return Err(EngineError::ConfigurationError {
                message: "the CUSTOM rating system cannot have a threshold table".to_string(),
            });
        }
        Ok(Self { tables })
    }

    pub fn table(&self, system: RatingSystem) -> Option<&ThresholdTable> {
        self.tables.get(&system)
    }

    /// Band containing `value` on `system`.
    ///
    /// Returns the unassigned band when the value is below the lowest bound or
    /// the system has no table.
    pub fn resolve_cohort(&self, system: RatingSystem, value: Rating) -> CohortBand {
        match self.tables.get(&system) {
            Some(table) => table.band_for(value),
            None => CohortBand::unassigned(),
        }
    }

    /// Resolve a cohort for autopick, where an unresolvable rating is an error.
    ///
    /// Custom is rejected as a validation failure. An unassigned result means
    /// the tables do not cover a well-formed rating and is reported as
    /// [`EngineError::UnresolvedCohort`].
    pub fn autopick(&self, system: RatingSystem, value: Rating) -> EngineResult<CohortBand> {
        if system.is_custom() {
            return Err(EngineError::validation(
                "ratingSystem cannot be CUSTOM when autopicking a cohort",
            ));
        }

        let band = self.resolve_cohort(system, value);
        debug!("Resolved {} rating {} to cohort {}", system, value, band);

        if band.is_unassigned() {
            return Err(EngineError::UnresolvedCohort {
                system,
                rating: value,
            });
        }
        Ok(band)
    }

    /// Whether `band` is a real band of at least one table
    pub fn is_known_band(&self, band: &CohortBand) -> bool {
        !band.is_unassigned()
            && self
                .tables
                .values()
                .any(|table| table.position_of(band).is_some())
    }
}
