//! Cohort band and threshold table configuration
//!
//! Every table lists one lower bound per configured band, in band order, so
//! all calibrated systems share the same band sequence.

use crate::cohort::{CohortResolver, Threshold, ThresholdTable};
use crate::error::{EngineError, EngineResult};
use crate::types::{Rating, RatingSystem, NO_COHORT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

const DEFAULT_BANDS: [&str; 23] = [
    "0-300", "300-400", "400-500", "500-600", "600-700", "700-800", "800-900", "900-1000",
    "1000-1100", "1100-1200", "1200-1300", "1300-1400", "1400-1500", "1500-1600", "1600-1700",
    "1700-1800", "1800-1900", "1900-2000", "2000-2100", "2100-2200", "2200-2300", "2300-2400",
    "2400+",
];

const CHESSCOM_BOUNDS: [Rating; 23] = [
    0, 550, 650, 750, 850, 950, 1050, 1150, 1250, 1350, 1450, 1550, 1650, 1750, 1850, 1950, 2050,
    2165, 2275, 2360, 2425, 2485, 2550,
];

const LICHESS_BOUNDS: [Rating; 23] = [
    0, 1035, 1100, 1165, 1225, 1290, 1350, 1415, 1475, 1575, 1675, 1750, 1825, 1900, 1975, 2050,
    2125, 2200, 2275, 2350, 2425, 2500, 2575,
];

const FIDE_BOUNDS: [Rating; 23] = [
    0, 1250, 1310, 1370, 1430, 1490, 1550, 1610, 1670, 1730, 1790, 1850, 1910, 1970, 2030, 2090,
    2150, 2200, 2250, 2300, 2350, 2400, 2450,
];

const USCF_BOUNDS: [Rating; 23] = [
    0, 350, 450, 550, 650, 750, 850, 950, 1050, 1150, 1250, 1350, 1450, 1550, 1650, 1750, 1850,
    1950, 2050, 2150, 2250, 2350, 2450,
];

/// Lower bounds for one rating system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemThresholds {
    pub system: RatingSystem,
    /// One lower bound per band, strictly increasing
    pub bounds: Vec<Rating>,
}

/// Cohort bands and the per-system tables that place ratings into them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortSettings {
    /// Band labels in ascending order
    pub bands: Vec<String>,
    pub tables: Vec<SystemThresholds>,
}

impl Default for CohortSettings {
    fn default() -> Self {
        let table = |system, bounds: [Rating; 23]| SystemThresholds {
            system,
            bounds: bounds.to_vec(),
        };

        Self {
            bands: DEFAULT_BANDS.iter().map(|band| band.to_string()).collect(),
            tables: vec![
                table(RatingSystem::Chesscom, CHESSCOM_BOUNDS),
                table(RatingSystem::Lichess, LICHESS_BOUNDS),
                table(RatingSystem::Fide, FIDE_BOUNDS),
                table(RatingSystem::Uscf, USCF_BOUNDS),
            ],
        }
    }
}

impl CohortSettings {
    /// Check band labels and table shapes
    pub fn validate(&self) -> EngineResult<()> {
        if self.bands.is_empty() {
            return Err(configuration("at least one cohort band is required"));
        }

        let mut seen = HashSet::new();
        for band in &self.bands {
            if band.trim().is_empty() || band == NO_COHORT {
                return Err(configuration(format!("invalid cohort band label: {:?}", band)));
            }
            if !seen.insert(band.as_str()) {
                return Err(configuration(format!("duplicate cohort band: {}", band)));
            }
        }

        let mut systems = HashSet::new();
        for table in &self.tables {
            if !systems.insert(table.system) {
                return Err(configuration(format!(
                    "duplicate threshold table for {}",
                    table.system
                )));
            }
            if table.bounds.len() != self.bands.len() {
                return Err(configuration(format!(
                    "{} table has {} bounds for {} bands",
                    table.system,
                    table.bounds.len(),
                    self.bands.len()
                )));
            }
        }

        Ok(())
    }

    /// Build the resolver these settings describe
    pub fn to_resolver(&self) -> EngineResult<CohortResolver> {
        self.validate()?;

        let mut tables = BTreeMap::new();
        for table in &self.tables {
            let thresholds = table
                .bounds
                .iter()
                .zip(&self.bands)
                .map(|(lower, band)| Threshold::new(*lower, band.clone()))
                .collect();
            tables.insert(table.system, ThresholdTable::new(thresholds)?);
        }

        CohortResolver::new(tables)
    }
}

fn configuration(message: impl Into<String>) -> EngineError {
    EngineError::ConfigurationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CohortBand;

    #[test]
    fn test_default_settings_build_a_resolver() {
        let resolver = CohortSettings::default().to_resolver().unwrap();

        assert_eq!(
            resolver.resolve_cohort(RatingSystem::Chesscom, 1000),
            CohortBand::new("700-800")
        );
        assert_eq!(
            resolver.resolve_cohort(RatingSystem::Fide, 2500),
            CohortBand::new("2400+")
        );
        assert_eq!(
            resolver.resolve_cohort(RatingSystem::Lichess, 100),
            CohortBand::new("0-300")
        );
        assert!(resolver
            .resolve_cohort(RatingSystem::Custom, 1500)
            .is_unassigned());
    }

    #[test]
    fn test_rejects_mismatched_bounds() {
        let mut settings = CohortSettings::default();
        settings.tables[0].bounds.pop();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_bands_and_tables() {
        let mut settings = CohortSettings::default();
        settings.bands[1] = settings.bands[0].clone();
        assert!(settings.validate().is_err());

        let mut settings = CohortSettings::default();
        let duplicate = settings.tables[0].clone();
        settings.tables.push(duplicate);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_unordered_bounds() {
        let mut settings = CohortSettings::default();
        settings.tables[0].bounds.swap(3, 4);
        assert!(settings.to_resolver().is_err());
    }

    #[test]
    fn test_rejects_custom_table() {
        let mut settings = CohortSettings::default();
        settings.tables[0].system = RatingSystem::Custom;
        assert!(settings.to_resolver().is_err());
    }
}
