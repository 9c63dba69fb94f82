//! Utility functions for the cohort engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique id for one update request
pub fn generate_update_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Trim a provider username the way it is stored
pub fn normalize_username(username: &str) -> &str {
    username.trim()
}

/// Source of the timestamps written into rating history
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        current_timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_update_id();
        let id2 = generate_update_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  magnus123 "), "magnus123");
        assert_eq!(normalize_username("   "), "");
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
