use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_active: bool,
    pub expiry_date: Option<DateTime>,
    pub published_by: Option<String>,
    pub push_sent: Option<bool>,
    pub push_sent_at: Option<DateTime>,
    pub push_recipients: Option<u32>,
    pub push_failed: Option<u32>,
    pub push_error: Option<String>,
    pub push_attempted_at: Option<DateTime>,
    /// Missing on hand-edited documents; those rank as oldest.
    #[serde(default = "unix_epoch")]
    pub created_at: DateTime,
    #[serde(default)]
    pub updated_at: Option<DateTime>,
}

fn unix_epoch() -> DateTime {
    DateTime::from_millis(0)
}

impl Announcement {
    pub const COLLECTION: &'static str = "announcements";

    /// A fresh record with no expiry and no push audit.
    pub fn new(title: impl Into<String>, message: impl Into<String>, priority: Priority, is_active: bool) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            title: title.into(),
            message: message.into(),
            priority,
            is_active,
            expiry_date: None,
            published_by: None,
            push_sent: None,
            push_sent_at: None,
            push_recipients: None,
            push_failed: None,
            push_error: None,
            push_attempted_at: None,
            created_at: now,
            updated_at: Some(now),
        }
    }

    pub fn last_updated(&self) -> DateTime {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// An expiry exactly equal to `now` is still valid.
    pub fn is_expired(&self, now: DateTime) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    pub fn is_displayable(&self, now: DateTime) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

/// Announcement priority. The derived order is the display order:
/// `Low < Medium < High`.
///
/// Stored values that are missing, null or unrecognised read back as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn weight(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Badge text shown to visitors.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "NOTIFICATION",
            Priority::Medium => "ANNOUNCEMENT",
            Priority::High => "EMERGENCY",
        }
    }

    /// Background used for the modal icon and the floating button.
    pub fn accent(self) -> &'static str {
        match self {
            Priority::Low => "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
            Priority::Medium => "linear-gradient(135deg, #f6ad55 0%, #ed8936 100%)",
            Priority::High => "linear-gradient(135deg, #e53e3e 0%, #c53030 100%)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl From<Option<String>> for Priority {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Priority::parse_lenient).unwrap_or_default()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
