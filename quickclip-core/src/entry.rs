use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A stored clip: the text, its code, and when it dies
///
/// Liveness is decided by the monotonic `deadline`. The wall-clock
/// `created_at`/`expires_at` pair is kept for display only.
#[derive(Debug, Clone)]
pub struct ClipEntry {
    id: u64,
    code: String,
    text: Arc<str>,
    ttl_seconds: u64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    deadline: Instant,
}

impl ClipEntry {
    pub(crate) fn new(
        id: u64,
        code: String,
        text: Arc<str>,
        ttl: Duration,
        now: Instant,
        created_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| created_at.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id,
            code,
            text,
            ttl_seconds: ttl.as_secs(),
            created_at,
            expires_at,
            deadline: now + ttl,
        }
    }

    /// Insertion id, unique within one store
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Returns the public code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the stored text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the lifetime requested at creation
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the monotonic instant at which the entry stops being live
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Checks if this entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Whole seconds left before expiry, rounded down; 0 once expired
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds_at(Instant::now())
    }

    pub(crate) fn remaining_seconds_at(&self, now: Instant) -> u64 {
        self.deadline.saturating_duration_since(now).as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_ttl(ttl: Duration) -> ClipEntry {
        ClipEntry::new(
            1,
            "ABC234".to_string(),
            Arc::from("test_value"),
            ttl,
            Instant::now(),
            Utc::now(),
        )
    }

    #[test]
    fn test_entry_not_expired() {
        let entry = entry_with_ttl(Duration::from_secs(60));

        assert_eq!(entry.text(), "test_value");
        assert_eq!(entry.code(), "ABC234");
        assert_eq!(entry.ttl_seconds(), 60);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = entry_with_ttl(Duration::ZERO);

        assert!(entry.is_expired());
        assert_eq!(entry.remaining_seconds(), 0);
    }

    #[test]
    fn test_expires_at_matches_ttl() {
        let entry = entry_with_ttl(Duration::from_secs(90));
        let delta = entry.expires_at() - entry.created_at();
        assert_eq!(delta.num_seconds(), 90);
    }

    #[test]
    fn test_remaining_seconds_at() {
        let entry = entry_with_ttl(Duration::from_secs(60));
        let start = entry.deadline() - Duration::from_secs(60);

        assert_eq!(entry.remaining_seconds_at(start), 60);
        assert_eq!(entry.remaining_seconds_at(start + Duration::from_millis(500)), 59);
        assert_eq!(entry.remaining_seconds_at(start + Duration::from_secs(59)), 1);
        assert_eq!(entry.remaining_seconds_at(entry.deadline()), 0);
        assert_eq!(entry.remaining_seconds_at(entry.deadline() + Duration::from_secs(5)), 0);
        assert!(entry.is_expired_at(entry.deadline()));
        assert!(!entry.is_expired_at(entry.deadline() - Duration::from_millis(1)));
    }
}
