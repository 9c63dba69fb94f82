//! USCF regular rating adapter

use crate::error::FetchError;
use crate::provider::adapter::RatingProvider;
use crate::provider::http::{endpoint_url, get_json, rating_from_json};
use crate::types::{Rating, RatingSystem};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Rating system code of the regular (over-the-board, slow) rating
const REGULAR_RATING_CODE: &str = "R";

/// Looks up a member id on the ratings API and reads the regular rating
pub struct UscfProvider {
    client: Client,
    base_url: String,
}

impl UscfProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn member_url(&self, member_id: &str) -> Result<Url, FetchError> {
        endpoint_url(&self.base_url, &["api", "v1", "members", member_id])
    }

    pub fn parse_rating(body: &serde_json::Value, member_id: &str) -> Result<Rating, FetchError> {
        let ratings = body["ratings"].as_array().ok_or_else(|| FetchError::Transient {
            message: format!("USCF response for {} has no ratings list", member_id),
        })?;

        ratings
            .iter()
            .find(|r| r["ratingSystem"].as_str() == Some(REGULAR_RATING_CODE))
            .and_then(|r| rating_from_json(&r["rating"]))
            // members without a regular rating are treated as unknown
            .ok_or_else(|| FetchError::NotFound {
                username: member_id.to_string(),
            })
    }
}

#[async_trait]
impl RatingProvider for UscfProvider {
    fn system(&self) -> RatingSystem {
        RatingSystem::Uscf
    }

    async fn fetch_rating(&self, member_id: &str) -> Result<Rating, FetchError> {
        if !member_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(FetchError::NotFound {
                username: member_id.to_string(),
            });
        }

        let url = self.member_url(member_id)?;
        let body = get_json(&self.client, url.as_str(), member_id).await?;
        Self::parse_rating(&body, member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_regular_rating() {
        let body = json!({
            "id": "12345678",
            "ratings": [
                { "ratingSystem": "Q", "rating": 1710 },
                { "ratingSystem": "R", "rating": 1685, "isProvisional": false },
                { "ratingSystem": "B", "rating": 1650 }
            ]
        });
        assert_eq!(UscfProvider::parse_rating(&body, "12345678"), Ok(1685));
    }

    #[test]
    fn test_member_without_regular_rating() {
        let body = json!({ "id": "12345678", "ratings": [{ "ratingSystem": "Q", "rating": 900 }] });
        assert!(matches!(
            UscfProvider::parse_rating(&body, "12345678"),
            Err(FetchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_numeric_member_id_is_not_found() {
        let provider = UscfProvider::new(Client::new(), "http://127.0.0.1:9");
        assert!(matches!(
            provider.fetch_rating("not-an-id").await,
            Err(FetchError::NotFound { .. })
        ));
    }
}
