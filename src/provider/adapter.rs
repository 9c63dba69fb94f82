//! Provider adapter interface
//!
//! One adapter exists per supported rating system. Adapters only fetch; they
//! never retry and never touch the student record.

use crate::error::FetchError;
use crate::types::{Rating, RatingSystem};
use async_trait::async_trait;

/// Uniform interface to one external rating source
#[async_trait]
pub trait RatingProvider: Send + Sync {
    /// The rating system this adapter serves
    fn system(&self) -> RatingSystem;

    /// Fetch the current rating for a provider-specific username.
    ///
    /// Must return [`FetchError::NotFound`] for unknown usernames and
    /// [`FetchError::Transient`] for failures worth retrying later.
    async fn fetch_rating(&self, username: &str) -> Result<Rating, FetchError>;
}
