//! Per-visitor display memory: which announcements were closed or
//! minimized, where the floating button sits, and the visitor's push
//! identity. Nothing here is synced to the server.

use std::collections::HashMap;
use std::sync::Arc;

use herald_config::NotificationSettings;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CLOSED_KEY: &str = "closed_announcements";
pub const POSITION_KEY: &str = "floating_button_position";
pub const VISITOR_ID_KEY: &str = "visitor_id";
pub const NOTIFICATIONS_ENABLED_KEY: &str = "notifications_enabled";
pub const PUSH_TOKEN_KEY: &str = "push_token";
pub const DEFAULT_CLOSED_LIMIT: usize = 20;

fn minimized_key(id: &str) -> String {
    format!("announcement_{id}_minimized")
}

/// String key/value storage scoped to one origin, like a browser's local
/// storage. Concurrent writers race; the last write wins.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonPosition {
    pub x: f64,
    pub y: f64,
}

pub struct DisplayState<S> {
    store: S,
    closed_limit: usize,
}

impl<S: StateStore> DisplayState<S> {
    pub fn new(store: S) -> Self {
        Self::with_limit(store, DEFAULT_CLOSED_LIMIT)
    }

    /// Uses the configured `closed_limit`.
    pub fn from_settings(store: S, settings: &NotificationSettings) -> Self {
        Self::with_limit(store, settings.closed_limit)
    }

    pub fn with_limit(store: S, closed_limit: usize) -> Self {
        Self {
            store,
            closed_limit: closed_limit.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable display state");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.store.set(key, raw),
            Err(e) => warn!(key, error = %e, "Failed to persist display state"),
        }
    }

    /// Oldest first.
    pub fn closed_ids(&self) -> Vec<String> {
        self.read_json(CLOSED_KEY).unwrap_or_default()
    }

    pub fn is_closed(&self, id: &str) -> bool {
        self.closed_ids().iter().any(|c| c == id)
    }

    /// Records a dismissal and drops the minimized flag. Closing an
    /// already closed ID leaves the list untouched. Returns whether the ID
    /// was newly added.
    pub fn close(&self, id: &str) -> bool {
        self.store.remove(&minimized_key(id));

        let mut closed = self.closed_ids();
        if closed.iter().any(|c| c == id) {
            return false;
        }
        closed.push(id.to_string());
        if closed.len() > self.closed_limit {
            let overflow = closed.len() - self.closed_limit;
            closed.drain(..overflow);
        }
        self.write_json(CLOSED_KEY, &closed);
        true
    }

    pub fn is_minimized(&self, id: &str) -> bool {
        self.store.get(&minimized_key(id)).as_deref() == Some("true")
    }

    pub fn set_minimized(&self, id: &str, minimized: bool) {
        if minimized {
            self.store.set(&minimized_key(id), "true".to_string());
        } else {
            self.store.remove(&minimized_key(id));
        }
    }

    pub fn position(&self) -> Option<ButtonPosition> {
        self.read_json(POSITION_KEY)
    }

    pub fn save_position(&self, x: f64, y: f64) {
        self.write_json(POSITION_KEY, &ButtonPosition { x, y });
    }

    /// Stable identifier used as the push-token owner. Generated on first
    /// use as `visitor_<epoch millis>_<9 base36 chars>`.
    pub fn visitor_id(&self) -> String {
        if let Some(id) = self.store.get(VISITOR_ID_KEY) {
            return id;
        }
        let mut rng = rand::rng();
        let suffix: String = (0..9)
            .map(|_| std::char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
            .collect();
        let id = format!("visitor_{}_{}", chrono::Utc::now().timestamp_millis(), suffix);
        self.store.set(VISITOR_ID_KEY, id.clone());
        id
    }

    pub fn notifications_enabled(&self) -> bool {
        self.store.get(NOTIFICATIONS_ENABLED_KEY).as_deref() == Some("true")
    }

    pub fn set_notifications_enabled(&self, enabled: bool) {
        if enabled {
            self.store.set(NOTIFICATIONS_ENABLED_KEY, "true".to_string());
        } else {
            self.store.remove(NOTIFICATIONS_ENABLED_KEY);
            self.store.remove(PUSH_TOKEN_KEY);
        }
    }

    pub fn record_subscription(&self, push_token: &str) {
        self.set_notifications_enabled(true);
        self.store.set(PUSH_TOKEN_KEY, push_token.to_string());
    }

    pub fn push_token(&self) -> Option<String> {
        self.store.get(PUSH_TOKEN_KEY)
    }
}
