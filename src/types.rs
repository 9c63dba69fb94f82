//! Common types used throughout the cohort engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for students
pub type StudentId = String;

/// A rating on one provider's scale
pub type Rating = i32;

/// Supported rating providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RatingSystem {
    /// Chess.com rapid
    Chesscom,
    /// Lichess rapid
    Lichess,
    Fide,
    Uscf,
    /// User-entered rating; never fetched
    Custom,
}

impl RatingSystem {
    pub const ALL: [RatingSystem; 5] = [
        RatingSystem::Chesscom,
        RatingSystem::Lichess,
        RatingSystem::Fide,
        RatingSystem::Uscf,
        RatingSystem::Custom,
    ];

    pub fn is_custom(self) -> bool {
        self == RatingSystem::Custom
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RatingSystem::Chesscom => "CHESSCOM",
            RatingSystem::Lichess => "LICHESS",
            RatingSystem::Fide => "FIDE",
            RatingSystem::Uscf => "USCF",
            RatingSystem::Custom => "CUSTOM",
        }
    }

    /// Lowercase label used for metrics and log fields
    pub fn label(self) -> &'static str {
        match self {
            RatingSystem::Chesscom => "chesscom",
            RatingSystem::Lichess => "lichess",
            RatingSystem::Fide => "fide",
            RatingSystem::Uscf => "uscf",
            RatingSystem::Custom => "custom",
        }
    }
}

impl fmt::Display for RatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingSystem {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chesscom" | "chess.com" => Ok(RatingSystem::Chesscom),
            "lichess" => Ok(RatingSystem::Lichess),
            "fide" => Ok(RatingSystem::Fide),
            "uscf" => Ok(RatingSystem::Uscf),
            "custom" => Ok(RatingSystem::Custom),
            other => Err(format!("unknown rating system: {}", other)),
        }
    }
}

/// A dated rating observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingHistory {
    pub date: DateTime<Utc>,
    pub rating: Rating,
}

/// A student's rating on one system
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub username: String,
    pub current_rating: Rating,
    pub start_rating: Rating,
    #[serde(default)]
    pub history: Vec<RatingHistory>,
}

impl RatingEntry {
    /// Create an unfetched entry for a username
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Create an entry carrying values the caller already knows
    pub fn with_ratings(username: impl Into<String>, current: Rating, start: Rating) -> Self {
        Self {
            username: username.into(),
            current_rating: current,
            start_rating: start,
            history: Vec::new(),
        }
    }

    /// Whether a prior fetch completed for this username
    pub fn is_fetched(&self) -> bool {
        self.current_rating != 0 && self.start_rating != 0
    }

    /// Difference between current and start rating, 0 while either is unset
    pub fn rating_change(&self) -> Rating {
        if self.is_fetched() {
            self.current_rating - self.start_rating
        } else {
            0
        }
    }

    /// Store a freshly observed rating.
    ///
    /// Sets the start rating if it was never set and appends to the history,
    /// clamping the date so history never goes backwards.
    pub fn record(&mut self, rating: Rating, now: DateTime<Utc>) {
        if self.start_rating == 0 {
            self.start_rating = rating;
        }
        self.current_rating = rating;

        let date = match self.history.last() {
            Some(last) if last.date > now => last.date,
            _ => now,
        };
        self.history.push(RatingHistory { date, rating });
    }

    /// Switch to a different username, clearing ratings so they are fetched again
    pub fn reset_for_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.current_rating = 0;
        self.start_rating = 0;
    }
}

/// All of a student's ratings, keyed by system
pub type RatingSet = BTreeMap<RatingSystem, RatingEntry>;

/// Label of the sentinel cohort for ratings no band covers
pub const NO_COHORT: &str = "NO_COHORT";

/// A training cohort (rating band) such as "1000-1100" or "2400+"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortBand(String);

impl CohortBand {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The sentinel band returned when no threshold covers a value
    pub fn unassigned() -> Self {
        Self(NO_COHORT.to_string())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0 == NO_COHORT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CohortBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The student record the engine reads and replaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub preferred_system: Option<RatingSystem>,
    #[serde(default)]
    pub cohort: Option<CohortBand>,
    #[serde(default)]
    pub ratings: RatingSet,
}

impl Student {
    pub fn new(id: impl Into<StudentId>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            preferred_system: None,
            cohort: None,
            ratings: RatingSet::new(),
        }
    }

    pub fn with_rating(mut self, system: RatingSystem, entry: RatingEntry) -> Self {
        self.ratings.insert(system, entry);
        self
    }

    pub fn with_cohort(mut self, cohort: CohortBand) -> Self {
        self.cohort = Some(cohort);
        self
    }

    /// Current rating on the preferred system, if one is configured
    pub fn preferred_rating(&self) -> Option<Rating> {
        self.preferred_system
            .and_then(|system| self.ratings.get(&system))
            .map(|entry| entry.current_rating)
    }
}

/// Request to derive a cohort from the preferred system's rating
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopickRequest {
    pub preferred_system: Option<RatingSystem>,
    #[serde(default)]
    pub ratings: RatingSet,
}

/// A value ranked against the whole population and against its cohort
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileStat {
    pub value: Rating,
    pub percentile_in_population: f64,
    pub percentile_in_cohort: f64,
}
