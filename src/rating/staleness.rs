//! Decides whether a stored rating must be fetched again

use crate::types::{RatingEntry, RatingSystem};
use crate::utils::normalize_username;

/// Whether `system` must be re-fetched for this update.
///
/// `incoming_username` is the username submitted with the update; `None`
/// keeps the stored one. Rules apply in order:
///
/// 1. Custom ratings are user-entered and never fetched.
/// 2. An empty username has nothing to fetch.
/// 3. A missing entry or a changed username needs a fetch.
/// 4. A stored entry whose fetch never completed (current or start still 0) needs a fetch.
/// 5. Anything else keeps its stored values.
pub fn needs_refresh(
    system: RatingSystem,
    existing: Option<&RatingEntry>,
    incoming_username: Option<&str>,
) -> bool {
    if system.is_custom() {
        return false;
    }

    let username = match (incoming_username, existing) {
        (Some(incoming), _) => normalize_username(incoming),
        (None, Some(entry)) => normalize_username(&entry.username),
        (None, None) => "",
    };
    if username.is_empty() {
        return false;
    }

    match existing {
        None => true,
        Some(entry) if normalize_username(&entry.username) != username => true,
        Some(entry) => entry.current_rating == 0 || entry.start_rating == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_never_refreshes() {
        assert!(!needs_refresh(RatingSystem::Custom, None, Some("me")));

        let stale = RatingEntry::new("me");
        assert!(!needs_refresh(
            RatingSystem::Custom,
            Some(&stale),
            Some("someone-else")
        ));
    }

    #[test]
    fn test_missing_entry_refreshes() {
        assert!(needs_refresh(RatingSystem::Lichess, None, Some("magnus123")));
    }

    #[test]
    fn test_changed_username_refreshes() {
        let stored = RatingEntry::with_ratings("old-name", 1800, 1700);
        assert!(needs_refresh(
            RatingSystem::Chesscom,
            Some(&stored),
            Some("new-name")
        ));
    }

    #[test]
    fn test_incomplete_fetch_refreshes() {
        let no_current = RatingEntry::with_ratings("magnus123", 0, 1700);
        let no_start = RatingEntry::with_ratings("magnus123", 1800, 0);

        assert!(needs_refresh(
            RatingSystem::Fide,
            Some(&no_current),
            Some("magnus123")
        ));
        assert!(needs_refresh(RatingSystem::Fide, Some(&no_start), None));
    }

    #[test]
    fn test_complete_entry_is_kept() {
        let stored = RatingEntry::with_ratings("magnus123", 1800, 1700);

        assert!(!needs_refresh(
            RatingSystem::Uscf,
            Some(&stored),
            Some("magnus123")
        ));
        assert!(!needs_refresh(RatingSystem::Uscf, Some(&stored), None));
    }

    #[test]
    fn test_whitespace_is_not_a_username_change() {
        let stored = RatingEntry::with_ratings("magnus123", 1800, 1700);
        assert!(!needs_refresh(
            RatingSystem::Lichess,
            Some(&stored),
            Some("  magnus123 ")
        ));
    }

    #[test]
    fn test_empty_username_never_refreshes() {
        assert!(!needs_refresh(RatingSystem::Lichess, None, Some("")));
        assert!(!needs_refresh(RatingSystem::Lichess, None, Some("   ")));
        assert!(!needs_refresh(RatingSystem::Lichess, None, None));

        let cleared = RatingEntry::new("");
        assert!(!needs_refresh(RatingSystem::Lichess, Some(&cleared), None));

        let stored = RatingEntry::with_ratings("magnus123", 1800, 1700);
        assert!(!needs_refresh(RatingSystem::Lichess, Some(&stored), Some("")));
    }
}
