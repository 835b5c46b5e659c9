use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::selection::AnnouncementView;

/// Push message as delivered by the relay to a device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub notification: Option<NotificationContent>,
    #[serde(default)]
    pub data: Option<PushData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Relay data values arrive as strings or numbers depending on the
/// platform; `timestamp` accepts both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
    pub url: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "embedded_announcement")]
    pub announcement: Option<AnnouncementView>,
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The announcement may be an object or a JSON-encoded string. Anything
/// unreadable is dropped rather than failing the whole payload.
fn embedded_announcement<'de, D: Deserializer<'de>>(d: D) -> Result<Option<AnnouncementView>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(raw)) => serde_json::from_str(&raw).ok(),
        Some(v @ serde_json::Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

impl PushPayload {
    pub fn title(&self) -> Option<&str> {
        self.notification.as_ref()?.title.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.notification.as_ref()?.body.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.data.as_ref()?.timestamp.as_deref()
    }

    pub fn announcement(&self) -> Option<&AnnouncementView> {
        self.data.as_ref()?.announcement.as_ref()
    }

    /// Dedup key: the sender's timestamp when present, otherwise the
    /// title joined with the receipt time.
    pub fn fingerprint(&self, received_at: DateTime<Utc>) -> String {
        match self.timestamp() {
            Some(ts) => ts.to_string(),
            None => format!(
                "{}{}",
                self.title().unwrap_or_default(),
                received_at.timestamp_millis()
            ),
        }
    }
}
