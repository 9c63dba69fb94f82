//! Error types for the cohort engine
//!
//! Engine operations return [`EngineError`] so callers can tell client mistakes,
//! provider outages and configuration gaps apart. Configuration loading and the
//! binary use the anyhow-based [`Result`] alias.

use crate::types::{Rating, RatingSystem, Student};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias for configuration and application glue
pub type Result<T> = anyhow::Result<T>;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failure reported by a single provider adapter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// The provider has no account with this username; retrying will not help
    #[error("username not found: {username}")]
    NotFound { username: String },

    #[error("transient provider failure: {message}")]
    Transient { message: String },

    #[error("provider call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("no provider adapter configured for {system}")]
    Unsupported { system: RatingSystem },
}

impl FetchError {
    /// Whether a caller of the engine may retry the same fetch later
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient { .. } | FetchError::Timeout { .. })
    }
}

/// A provider failure attributed to the rating system it happened on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub system: RatingSystem,
    pub username: String,
    pub error: FetchError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.system, self.username, self.error)
    }
}

/// Errors surfaced by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    #[error("Rating fetch failed for {failure}")]
    Provider { failure: ProviderFailure },

    #[error("All {} rating fetches failed", .failures.len())]
    ProvidersUnavailable { failures: Vec<ProviderFailure> },

    /// The threshold tables do not cover a well-formed rating
    #[error("Unable to choose cohort for {system} rating {rating}")]
    UnresolvedCohort { system: RatingSystem, rating: Rating },

    #[error("Ratings merged with {} provider failure(s)", .failures.len())]
    PartialMerge {
        student: Box<Student>,
        failures: Vec<ProviderFailure>,
    },

    #[error("Student not found: {student_id}")]
    StudentNotFound { student_id: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation {
            reason: reason.into(),
        }
    }

    /// HTTP-style status a request handler should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::Validation { .. } => 400,
            EngineError::StudentNotFound { .. } => 404,
            EngineError::Provider { failure } => match failure.error {
                FetchError::NotFound { .. } => 400,
                _ => 502,
            },
            EngineError::ProvidersUnavailable { .. } => 502,
            EngineError::PartialMerge { .. } => 207,
            EngineError::UnresolvedCohort { .. }
            | EngineError::Persistence { .. }
            | EngineError::ConfigurationError { .. }
            | EngineError::InternalError { .. } => 500,
        }
    }

    /// Whether the error was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
