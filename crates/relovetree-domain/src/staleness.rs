//! Staleness comparison and cached check results

use crate::VersionMarker;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decide whether a clone has an update waiting at its source
///
/// An empty current source marker never reports an update. An empty recorded
/// marker reports an update whenever the source has any marker at all.
///
/// # Examples
///
/// ```
/// use relovetree_domain::{has_update, VersionMarker};
///
/// let recorded = VersionMarker::new("2024-01-01T00:00:00Z");
/// let current = VersionMarker::new("2024-02-01T00:00:00Z");
/// assert!(has_update(&current, &recorded));
/// assert!(!has_update(&current, &current));
/// assert!(has_update(&current, &VersionMarker::empty()));
/// assert!(!has_update(&VersionMarker::empty(), &recorded));
/// ```
pub fn has_update(source_current: &VersionMarker, recorded: &VersionMarker) -> bool {
    !source_current.is_empty() && source_current != recorded
}

/// Result of one staleness check, cached per clone for the viewing user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StalenessStatus {
    /// When the check ran (milliseconds since Unix epoch)
    pub checked_at: u64,

    /// Whether the source had moved past the clone's recorded marker
    pub has_update: bool,

    /// Source marker observed by the check
    #[serde(default)]
    pub source_version_marker_at_check: VersionMarker,
}

impl StalenessStatus {
    /// Build a status observed at `checked_at`
    pub fn new(checked_at: u64, has_update: bool, observed: VersionMarker) -> Self {
        Self {
            checked_at,
            has_update,
            source_version_marker_at_check: observed,
        }
    }

    /// True when the entry is older than `ttl` at `now` (both in milliseconds)
    ///
    /// An entry exactly `ttl` old is still fresh.
    pub fn is_expired(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.checked_at) > ttl.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_expiry_boundaries() {
        let now = 1_700_000_000_000u64;
        let ttl_ms = TTL.as_millis() as u64;

        let just_expired = StalenessStatus::new(now - ttl_ms - 1, true, VersionMarker::empty());
        let just_fresh = StalenessStatus::new(now - ttl_ms + 1, true, VersionMarker::empty());
        let exactly_ttl = StalenessStatus::new(now - ttl_ms, true, VersionMarker::empty());

        assert!(just_expired.is_expired(now, TTL));
        assert!(!just_fresh.is_expired(now, TTL));
        assert!(!exactly_ttl.is_expired(now, TTL));
    }

    #[test]
    fn test_future_checked_at_is_fresh() {
        let status = StalenessStatus::new(2_000, false, VersionMarker::empty());
        assert!(!status.is_expired(1_000, TTL));
    }

    #[test]
    fn test_whitespace_source_marker_is_an_update() {
        let recorded = VersionMarker::new("2024-01-01T00:00:00Z");
        assert!(has_update(&VersionMarker::new(" "), &recorded));
        assert!(!has_update(&VersionMarker::new(" "), &VersionMarker::new(" ")));
    }

    #[test]
    fn test_status_json_shape() {
        let status = StalenessStatus::new(42, true, VersionMarker::new("2024-02-01T00:00:00Z"));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["checkedAt"], 42);
        assert_eq!(json["hasUpdate"], true);
        assert_eq!(json["sourceVersionMarkerAtCheck"], "2024-02-01T00:00:00Z");
    }
}
