use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Fixed-window memory of recently rendered push fingerprints.
///
/// Entries are never refreshed by a duplicate: the window runs from the
/// first sighting. Expired entries are ignored on lookup and pruned on
/// insert, so no timers are involved.
pub struct FingerprintCache {
    window: Duration,
    seen: DashMap<String, DateTime<Utc>>,
}

impl FingerprintCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: DashMap::new(),
        }
    }

    pub fn from_millis(window_ms: u64) -> Self {
        Self::new(Duration::milliseconds(window_ms as i64))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn is_live(&self, first_seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(first_seen) < self.window
    }

    /// Returns `true` when `fingerprint` has not been seen inside the
    /// window and records it; `false` for a duplicate.
    pub fn admit(&self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        self.seen.retain(|_, first_seen| self.is_live(*first_seen, now));

        match self.seen.entry(fingerprint.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
