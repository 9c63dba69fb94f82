//! Lichess rapid rating adapter

use crate::error::FetchError;
use crate::provider::adapter::RatingProvider;
use crate::provider::http::{endpoint_url, get_json, rating_from_json};
use crate::types::{Rating, RatingSystem};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Reads `perfs.rapid.rating` from the public user endpoint
pub struct LichessProvider {
    client: Client,
    base_url: String,
}

impl LichessProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn user_url(&self, username: &str) -> Result<Url, FetchError> {
        endpoint_url(&self.base_url, &["api", "user", username])
    }

    /// Extract the rapid rating from a user document
    pub fn parse_rating(body: &serde_json::Value, username: &str) -> Result<Rating, FetchError> {
        if body.get("disabled").and_then(|v| v.as_bool()) == Some(true) {
            return Err(FetchError::NotFound {
                username: username.to_string(),
            });
        }

        rating_from_json(&body["perfs"]["rapid"]["rating"]).ok_or_else(|| FetchError::Transient {
            message: format!("lichess response for {} has no rapid rating", username),
        })
    }
}

#[async_trait]
impl RatingProvider for LichessProvider {
    fn system(&self) -> RatingSystem {
        RatingSystem::Lichess
    }

    async fn fetch_rating(&self, username: &str) -> Result<Rating, FetchError> {
        let url = self.user_url(username)?;
        let body = get_json(&self.client, url.as_str(), username).await?;
        Self::parse_rating(&body, username)
    }
}
