//! Percentile ranking of a value within a population
//!
//! A value's percentile is the share of population members strictly below it.
//! Ties never count toward the rank, so a value only reaches 1.0 when every
//! member of the population is strictly lower.

use crate::types::{PercentileStat, Rating};

/// Fraction of `population` strictly less than `value`, in `[0, 1]`.
///
/// An empty population yields 0.
pub fn percentile<T: PartialOrd>(value: &T, population: &[T]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }

    let below = population.iter().filter(|member| *member < value).count();
    below as f64 / population.len() as f64
}

/// Rank `value` against the whole population and against the student's cohort
pub fn compute_stats(
    value: Rating,
    population: &[Rating],
    cohort_population: &[Rating],
) -> PercentileStat {
    PercentileStat {
        value,
        percentile_in_population: percentile(&value, population),
        percentile_in_cohort: percentile(&value, cohort_population),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_population_is_zero() {
        assert_eq!(percentile(&1500, &[]), 0.0);
        let stats = compute_stats(1500, &[], &[]);
        assert_eq!(stats.percentile_in_population, 0.0);
        assert_eq!(stats.percentile_in_cohort, 0.0);
    }

    #[test]
    fn test_unique_minimum_is_zero() {
        assert_eq!(percentile(&1000, &[1000, 1200, 1400, 1600]), 0.0);
    }

    #[test]
    fn test_unique_maximum_within_population() {
        // the member itself is not strictly less than itself
        assert_eq!(percentile(&1600, &[1000, 1200, 1400, 1600]), 0.75);
        // against strictly lesser members only it reaches 1
        assert_eq!(percentile(&1600, &[1000, 1200, 1400]), 1.0);
    }

    #[test]
    fn test_ties_do_not_count() {
        assert_eq!(percentile(&1500, &[1500, 1500, 1500, 1000]), 0.25);
    }

    #[test]
    fn test_cohort_restricted() {
        let stats = compute_stats(1550, &[900, 1100, 1500, 1550, 1600, 2000], &[1500, 1550, 1600]);
        assert_eq!(stats.value, 1550);
        assert!((stats.percentile_in_population - 0.5).abs() < f64::EPSILON);
        assert!((stats.percentile_in_cohort - 1.0 / 3.0).abs() < 1e-9);
    }
}
