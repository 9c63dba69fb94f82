//! Ordered threshold tables mapping ratings to cohort bands

use crate::error::{EngineError, EngineResult};
use crate::types::{CohortBand, Rating};
use serde::{Deserialize, Serialize};

/// Lower bound at which a band starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub lower_bound: Rating,
    pub band: CohortBand,
}

impl Threshold {
    pub fn new(lower_bound: Rating, band: impl Into<String>) -> Self {
        Self {
            lower_bound,
            band: CohortBand::new(band),
        }
    }
}

/// Thresholds for one rating system, strictly increasing by lower bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdTable {
    thresholds: Vec<Threshold>,
}

impl ThresholdTable {
    /// Build a table, rejecting empty, unordered or duplicated thresholds
    pub fn new(thresholds: Vec<Threshold>) -> EngineResult<Self> {
        if thresholds.is_empty() {
            return Err(EngineError::ConfigurationError {
                message: "threshold table must contain at least one band".to_string(),
            });
        }

        for pair in thresholds.windows(2) {
            if pair[1].lower_bound <= pair[0].lower_bound {
                return Err(EngineError::ConfigurationError {
                    message: format!(
                        "threshold lower bounds must be strictly increasing ({} then {})",
                        pair[0].lower_bound, pair[1].lower_bound
                    ),
                });
            }
        }

        for (i, threshold) in thresholds.iter().enumerate() {
            if threshold.band.is_unassigned() {
                return Err(EngineError::ConfigurationError {
                    message: "the unassigned cohort cannot appear in a threshold table"
                        .to_string(),
                });
            }
            if thresholds[..i].iter().any(|t| t.band == threshold.band) {
                return Err(EngineError::ConfigurationError {
                    message: format!("cohort {} appears twice in one table", threshold.band),
                });
            }
        }

        Ok(Self { thresholds })
    }

    /// Convenience constructor from `(lower_bound, band)` pairs
    pub fn from_pairs<S: Into<String>>(
        pairs: impl IntoIterator<Item = (Rating, S)>,
    ) -> EngineResult<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(lower, band)| Threshold::new(lower, band))
                .collect(),
        )
    }

    /// Index of the threshold with the highest lower bound `<= value`
    pub fn locate(&self, value: Rating) -> Option<usize> {
        let covering = self
            .thresholds
            .partition_point(|threshold| threshold.lower_bound <= value);
        covering.checked_sub(1)
    }

    /// Band containing `value`, or the unassigned band below the lowest bound
    pub fn band_for(&self, value: Rating) -> CohortBand {
        self.locate(value)
            .map(|i| self.thresholds[i].band.clone())
            .unwrap_or_else(CohortBand::unassigned)
    }

    /// Lower bound of the band containing `value`
    pub fn lower_bound_for(&self, value: Rating) -> Option<Rating> {
        self.locate(value).map(|i| self.thresholds[i].lower_bound)
    }

    /// `[lower, upper)` range of the band at `index`; the top band is open
    pub fn band_range(&self, index: usize) -> Option<(Rating, Option<Rating>)> {
        let threshold = self.thresholds.get(index)?;
        let upper = self.thresholds.get(index + 1).map(|t| t.lower_bound);
        Some((threshold.lower_bound, upper))
    }

    pub fn position_of(&self, band: &CohortBand) -> Option<usize> {
        self.thresholds.iter().position(|t| &t.band == band)
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn bands(&self) -> impl Iterator<Item = &CohortBand> {
        self.thresholds.iter().map(|t| &t.band)
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lichess_table() -> ThresholdTable {
        ThresholdTable::from_pairs([(0, "Beginner"), (1500, "Intermediate"), (2000, "Advanced")])
            .unwrap()
    }

    #[test]
    fn test_band_boundaries() {
        let table = lichess_table();
        assert_eq!(table.band_for(1999), CohortBand::new("Intermediate"));
        assert_eq!(table.band_for(2000), CohortBand::new("Advanced"));
        assert_eq!(table.band_for(0), CohortBand::new("Beginner"));
        assert_eq!(table.band_for(3200), CohortBand::new("Advanced"));
    }

    #[test]
    fn test_below_lowest_bound_is_unassigned() {
        let table = ThresholdTable::from_pairs([(800, "800-900"), (900, "900+")]).unwrap();
        assert!(table.band_for(799).is_unassigned());
        assert_eq!(table.locate(799), None);
        assert_eq!(table.lower_bound_for(850), Some(800));
    }

    #[test]
    fn test_band_range() {
        let table = lichess_table();
        assert_eq!(table.band_range(0), Some((0, Some(1500))));
        assert_eq!(table.band_range(2), Some((2000, None)));
        assert_eq!(table.band_range(3), None);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert!(ThresholdTable::new(Vec::new()).is_err());
        assert!(ThresholdTable::from_pairs([(0, "a"), (0, "b")]).is_err());
        assert!(ThresholdTable::from_pairs([(100, "a"), (50, "b")]).is_err());
        assert!(ThresholdTable::from_pairs([(0, "a"), (100, "a")]).is_err());
        assert!(ThresholdTable::from_pairs([(0, crate::types::NO_COHORT)]).is_err());
    }
}
