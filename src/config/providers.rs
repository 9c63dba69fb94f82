//! Rating provider configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoints and HTTP settings for the live provider adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// User agent sent with every provider request
    pub user_agent: String,
    /// HTTP client timeout in milliseconds
    pub http_timeout_ms: u64,
    pub lichess_base_url: String,
    pub chesscom_base_url: String,
    pub uscf_base_url: String,
    pub fide_base_url: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("cohort-engine/", env!("CARGO_PKG_VERSION")).to_string(),
            http_timeout_ms: 10_000,
            lichess_base_url: "https://lichess.org".to_string(),
            chesscom_base_url: "https://api.chess.com".to_string(),
            uscf_base_url: "https://ratings-api.uschess.org".to_string(),
            fide_base_url: "https://ratings.fide.com".to_string(),
        }
    }
}

impl ProviderSettings {
    /// HTTP client timeout as a Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}
