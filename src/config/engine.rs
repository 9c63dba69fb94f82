//! Reconciliation engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fan-out limits for provider fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Timeout applied to each provider fetch, in milliseconds
    pub fetch_timeout_ms: u64,
    /// Maximum provider fetches in flight for one update
    pub max_concurrent_fetches: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5_000,
            max_concurrent_fetches: 4,
        }
    }
}

impl EngineSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
