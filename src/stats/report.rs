//! Periodic progress reports
//!
//! Builds per-student rating reviews for a report period from a read-only
//! population snapshot. Every rating value in a review is ranked against all
//! students with a fetched rating on the same system, and against the ones
//! sharing the student's current cohort.

use crate::stats::percentile::compute_stats;
use crate::types::{
    CohortBand, PercentileStat, Rating, RatingEntry, RatingHistory, RatingSystem, Student,
    StudentId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Time window a report covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// Label such as "2024"
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    pub fn new(label: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Rating values of one entry as seen over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRatings {
    pub start: Rating,
    pub current: Rating,
    pub change: Rating,
}

impl PeriodRatings {
    /// Read the period's start and end values out of an entry's history.
    ///
    /// Start is the last observation at or before the period start, else the
    /// first one inside the period, else the entry's start rating. Current is
    /// the last observation at or before the period end, else the entry's
    /// current rating.
    pub fn from_entry(entry: &RatingEntry, period: &ReportPeriod) -> Self {
        let start = entry
            .history
            .iter()
            .rev()
            .find(|point| point.date <= period.start)
            .or_else(|| entry.history.iter().find(|point| period.contains(point.date)))
            .map(|point| point.rating)
            .unwrap_or(entry.start_rating);

        let current = entry
            .history
            .iter()
            .rev()
            .find(|point| point.date <= period.end)
            .map(|point| point.rating)
            .unwrap_or(entry.current_rating);

        let change = if start != 0 && current != 0 {
            current - start
        } else {
            0
        };

        Self {
            start,
            current,
            change,
        }
    }
}

/// One rating system's section of a progress report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingReview {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    pub is_preferred: bool,
    pub start_rating: PercentileStat,
    pub current_rating: PercentileStat,
    pub rating_change: PercentileStat,
    pub history: Vec<RatingHistory>,
}

/// A student's rating progress over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub student_id: StudentId,
    pub display_name: String,
    pub period: String,
    pub cohort: Option<CohortBand>,
    pub ratings: BTreeMap<RatingSystem, RatingReview>,
}

#[derive(Debug, Default)]
struct SystemPopulation {
    starts: Vec<Rating>,
    currents: Vec<Rating>,
    changes: Vec<Rating>,
    by_cohort: HashMap<CohortBand, SystemPopulation>,
}

impl SystemPopulation {
    fn push(&mut self, ratings: PeriodRatings) {
        self.starts.push(ratings.start);
        self.currents.push(ratings.current);
        self.changes.push(ratings.change);
    }
}

/// Builds progress reports against one population snapshot
#[derive(Debug)]
pub struct ReportBuilder {
    period: ReportPeriod,
    populations: BTreeMap<RatingSystem, SystemPopulation>,
    empty: SystemPopulation,
}

impl ReportBuilder {
    /// Index the snapshot once; reports are then built per student.
    ///
    /// Only entries with a username and a fetched current rating are part of
    /// the population.
    pub fn new(period: ReportPeriod, population: &[Student]) -> Self {
        let mut populations: BTreeMap<RatingSystem, SystemPopulation> = BTreeMap::new();

        for student in population {
            for (system, entry) in &student.ratings {
                if !Self::is_ranked(entry) {
                    continue;
                }
                let ratings = PeriodRatings::from_entry(entry, &period);
                let system_population = populations.entry(*system).or_default();
                system_population.push(ratings);
                if let Some(cohort) = &student.cohort {
                    system_population
                        .by_cohort
                        .entry(cohort.clone())
                        .or_default()
                        .push(ratings);
                }
            }
        }

        debug!(
            "Indexed {} students for report period {} across {} rating systems",
            population.len(),
            period.label,
            populations.len()
        );

        Self {
            period,
            populations,
            empty: SystemPopulation::default(),
        }
    }

    fn is_ranked(entry: &RatingEntry) -> bool {
        !entry.username.trim().is_empty() && entry.current_rating != 0
    }

    pub fn period(&self) -> &ReportPeriod {
        &self.period
    }

    /// Build the report for one student.
    ///
    /// Students without a cohort get a cohort percentile of 0. The cohort used
    /// is the one on the student record at report time.
    pub fn build(&self, student: &Student) -> ProgressReport {
        let mut ratings = BTreeMap::new();

        for (system, entry) in &student.ratings {
            if !Self::is_ranked(entry) {
                continue;
            }

            let values = PeriodRatings::from_entry(entry, &self.period);
            let population = self.populations.get(system).unwrap_or(&self.empty);
            let cohort_population = student
                .cohort
                .as_ref()
                .and_then(|cohort| population.by_cohort.get(cohort))
                .unwrap_or(&self.empty);

            let review = RatingReview {
                username: entry.username.clone(),
                is_preferred: student.preferred_system == Some(*system),
                start_rating: compute_stats(
                    values.start,
                    &population.starts,
                    &cohort_population.starts,
                ),
                current_rating: compute_stats(
                    values.current,
                    &population.currents,
                    &cohort_population.currents,
                ),
                rating_change: compute_stats(
                    values.change,
                    &population.changes,
                    &cohort_population.changes,
                ),
                history: entry
                    .history
                    .iter()
                    .filter(|point| self.period.contains(point.date))
                    .cloned()
                    .collect(),
            };
            ratings.insert(*system, review);
        }

        ProgressReport {
            student_id: student.id.clone(),
            display_name: student.display_name.clone(),
            period: self.period.label.clone(),
            cohort: student.cohort.clone(),
            ratings,
        }
    }

    /// Build reports for every student in `students`
    pub fn build_all(&self, students: &[Student]) -> Vec<ProgressReport> {
        students.iter().map(|student| self.build(student)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn period_2024() -> ReportPeriod {
        ReportPeriod::new("2024", date(2024, 1, 1), date(2024, 12, 31))
    }

    fn entry(username: &str, points: &[(DateTime<Utc>, Rating)]) -> RatingEntry {
        let mut entry = RatingEntry::new(username);
        for (when, rating) in points {
            entry.record(*rating, *when);
        }
        entry
    }

    #[test]
    fn test_period_ratings_from_history() {
        let entry = entry(
            "magnus123",
            &[
                (date(2023, 11, 1), 1500),
                (date(2024, 3, 1), 1600),
                (date(2024, 9, 1), 1700),
                (date(2025, 2, 1), 1800),
            ],
        );

        let values = PeriodRatings::from_entry(&entry, &period_2024());
        assert_eq!(values.start, 1500);
        assert_eq!(values.current, 1700);
        assert_eq!(values.change, 200);
    }

    #[test]
    fn test_period_start_falls_back_to_first_point_inside() {
        let entry = entry("new", &[(date(2024, 6, 1), 1200), (date(2024, 8, 1), 1300)]);
        let values = PeriodRatings::from_entry(&entry, &period_2024());
        assert_eq!(values.start, 1200);
        assert_eq!(values.current, 1300);
    }

    #[test]
    fn test_report_percentiles() {
        let intermediate = CohortBand::new("1500-1600");
        let students = vec![
            Student::new("a")
                .with_cohort(intermediate.clone())
                .with_rating(
                    RatingSystem::Lichess,
                    entry("a", &[(date(2024, 1, 1), 1500), (date(2024, 6, 1), 1550)]),
                ),
            Student::new("b")
                .with_cohort(intermediate.clone())
                .with_rating(
                    RatingSystem::Lichess,
                    entry("b", &[(date(2024, 1, 1), 1520), (date(2024, 6, 1), 1600)]),
                ),
            Student::new("c")
                .with_cohort(CohortBand::new("1000-1100"))
                .with_rating(
                    RatingSystem::Lichess,
                    entry("c", &[(date(2024, 1, 1), 1000), (date(2024, 6, 1), 1010)]),
                ),
        ];

        let builder = ReportBuilder::new(period_2024(), &students);
        let mut student = students[1].clone();
        student.preferred_system = Some(RatingSystem::Lichess);
        let report = builder.build(&student);

        let review = &report.ratings[&RatingSystem::Lichess];
        assert!(review.is_preferred);
        assert_eq!(review.current_rating.value, 1600);
        assert!((review.current_rating.percentile_in_population - 2.0 / 3.0).abs() < 1e-9);
        assert!((review.current_rating.percentile_in_cohort - 0.5).abs() < 1e-9);
        assert_eq!(review.rating_change.value, 80);
        assert!((review.rating_change.percentile_in_population - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(review.history.len(), 2);
    }

    #[test]
    fn test_unranked_entries_are_skipped() {
        let students = vec![Student::new("a")
            .with_rating(RatingSystem::Fide, RatingEntry::new(""))
            .with_rating(RatingSystem::Uscf, RatingEntry::new("12345678"))];

        let builder = ReportBuilder::new(period_2024(), &students);
        let report = builder.build(&students[0]);
        assert!(report.ratings.is_empty());
    }

    #[test]
    fn test_student_without_cohort_has_zero_cohort_percentile() {
        let students = vec![
            Student::new("a").with_rating(
                RatingSystem::Fide,
                RatingEntry::with_ratings("1503014", 2000, 1900),
            ),
            Student::new("b").with_rating(
                RatingSystem::Fide,
                RatingEntry::with_ratings("1503015", 1500, 1500),
            ),
        ];

        let builder = ReportBuilder::new(period_2024(), &students);
        let reports = builder.build_all(&students);
        let review = &reports[0].ratings[&RatingSystem::Fide];
        assert_eq!(review.current_rating.value, 2000);
        assert_eq!(review.current_rating.percentile_in_population, 0.5);
        assert_eq!(review.current_rating.percentile_in_cohort, 0.0);
    }
}
