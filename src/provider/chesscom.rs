//! Chess.com rapid rating adapter

use crate::error::FetchError;
use crate::provider::adapter::RatingProvider;
use crate::provider::http::{endpoint_url, get_json, rating_from_json};
use crate::types::{Rating, RatingSystem};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Reads `chess_rapid.last.rating` from the published player stats
pub struct ChesscomProvider {
    client: Client,
    base_url: String,
}

impl ChesscomProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn stats_url(&self, username: &str) -> Result<Url, FetchError> {
        // chess.com usernames are case-insensitive but the API expects lowercase
        let username = username.to_lowercase();
        endpoint_url(&self.base_url, &["pub", "player", username.as_str(), "stats"])
    }

    pub fn parse_rating(body: &serde_json::Value, username: &str) -> Result<Rating, FetchError> {
        rating_from_json(&body["chess_rapid"]["last"]["rating"]).ok_or_else(|| {
            FetchError::Transient {
                message: format!("chess.com stats for {} have no rapid rating", username),
            }
        })
    }
}

#[async_trait]
impl RatingProvider for ChesscomProvider {
    fn system(&self) -> RatingSystem {
        RatingSystem::Chesscom
    }

    async fn fetch_rating(&self, username: &str) -> Result<Rating, FetchError> {
        let url = self.stats_url(username)?;
        let body = get_json(&self.client, url.as_str(), username).await?;
        Self::parse_rating(&body, username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rapid_rating() {
        let body = json!({
            "chess_rapid": {
                "last": { "rating": 1432, "date": 1700000000, "rd": 45 },
                "best": { "rating": 1510 }
            },
            "chess_blitz": { "last": { "rating": 1210 } }
        });
        assert_eq!(ChesscomProvider::parse_rating(&body, "hikaru"), Ok(1432));
    }

    #[test]
    fn test_no_rapid_games() {
        let body = json!({ "chess_blitz": { "last": { "rating": 1210 } } });
        assert!(ChesscomProvider::parse_rating(&body, "blitzer").is_err());
    }

    #[test]
    fn test_stats_url_lowercases() {
        let provider = ChesscomProvider::new(Client::new(), "https://api.chess.com");
        assert_eq!(
            provider.stats_url("Hikaru").unwrap().as_str(),
            "https://api.chess.com/pub/player/hikaru/stats"
        );
    }
}
