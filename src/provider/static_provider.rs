//! In-memory rating provider for development and testing

use crate::error::FetchError;
use crate::provider::adapter::RatingProvider;
use crate::types::{Rating, RatingSystem};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Serves preset ratings and records every username it was asked for
#[derive(Debug)]
pub struct StaticRatingProvider {
    system: RatingSystem,
    ratings: RwLock<HashMap<String, Result<Rating, FetchError>>>,
    calls: RwLock<Vec<String>>,
    delay: Option<Duration>,
}

impl StaticRatingProvider {
    pub fn new(system: RatingSystem) -> Self {
        Self {
            system,
            ratings: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            delay: None,
        }
    }

    /// Delay every fetch, to simulate provider latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_rating(self, username: &str, rating: Rating) -> Self {
        self.set_result(username, Ok(rating));
        self
    }

    pub fn with_failure(self, username: &str, error: FetchError) -> Self {
        self.set_result(username, Err(error));
        self
    }

    /// Replace the answer for a username
    pub fn set_result(&self, username: &str, result: Result<Rating, FetchError>) {
        if let Ok(mut ratings) = self.ratings.write() {
            ratings.insert(username.to_string(), result);
        }
    }

    /// Usernames fetched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RatingProvider for StaticRatingProvider {
    fn system(&self) -> RatingSystem {
        self.system
    }

    async fn fetch_rating(&self, username: &str) -> Result<Rating, FetchError> {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(username.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let ratings = self.ratings.read().map_err(|_| FetchError::Transient {
            message: "Failed to acquire ratings read lock".to_string(),
        })?;

        ratings
            .get(username)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::NotFound {
                    username: username.to_string(),
                })
            })
    }
}
