//! Conversion of ratings between calibrated systems
//!
//! A rating is placed in its band on the source table, and the same relative
//! position is taken inside the same band of the target table. The open top
//! band keeps the raw distance above its floor.

use crate::cohort::resolver::CohortResolver;
use crate::types::{Rating, RatingSystem};

impl CohortResolver {
    /// Convert `value` on `system` to the scale of `target`.
    ///
    /// Returns `None` for uncalibrated systems (including custom), for values
    /// below the source table, when the target table lacks the band, or when
    /// the converted value does not fit a rating.
    pub fn normalize(
        &self,
        system: RatingSystem,
        value: Rating,
        target: RatingSystem,
    ) -> Option<Rating> {
        let source_table = self.table(system)?;
        let target_table = self.table(target)?;
        if system == target {
            return Some(value);
        }

        let index = source_table.locate(value)?;
        let band = &source_table.thresholds()[index].band;
        let (lower, upper) = source_table.band_range(index)?;

        let target_index = target_table.position_of(band)?;
        let (target_lower, target_upper) = target_table.band_range(target_index)?;

        let offset = i64::from(value) - i64::from(lower);
        let normalized = match (upper, target_upper) {
            (Some(upper), Some(target_upper)) => {
                let width = i64::from(upper) - i64::from(lower);
                let target_width = i64::from(target_upper) - i64::from(target_lower);
                let position = offset as f64 / width as f64;
                i64::from(target_lower) + (position * target_width as f64).round() as i64
            }
            _ => i64::from(target_lower) + offset,
        };

        // Out-of-range results on the open top band have no rating
        Rating::try_from(normalized).ok()
    }
}
