use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use herald_config::Settings;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{FingerprintCache, PageMessage, PushPayload};
use crate::selection::AnnouncementView;

pub const DEEP_LINK_PARAM: &str = "showAnnouncement";
pub const DISMISS_ACTION: &str = "dismiss";
pub const VIEW_ACTION: &str = "view";
/// How long an in-page banner stays up.
pub const BANNER_TTL: StdDuration = StdDuration::from_secs(8);

const DEFAULT_BODY: &str = "New announcement available";
const DEFAULT_PRIORITY: &str = "normal";

/// Options handed to the OS notification API. Field names follow the
/// browser's `showNotification` options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Constant, so a new notification replaces the previous one.
    pub tag: String,
    pub renotify: bool,
    pub require_interaction: bool,
    pub silent: bool,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    pub click_action: String,
    pub priority: String,
    pub timestamp: String,
    pub announcement: Option<AnnouncementView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A page window known to the background context.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focusable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Ignore,
    Focus {
        window_id: String,
        message: Option<PageMessage>,
    },
    OpenWindow {
        url: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub title: String,
    pub message: String,
    pub ttl: StdDuration,
}

pub struct BackgroundHandler {
    site_url: String,
    site_origin: Option<Url>,
    site_name: String,
    tag: String,
    icon: String,
    badge: String,
    seen: FingerprintCache,
}

impl BackgroundHandler {
    pub fn from_settings(settings: &Settings) -> Self {
        let n = &settings.notifications;
        let site_origin = match Url::parse(&settings.app.site_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(site_url = %settings.app.site_url, error = %e, "Site URL is not a valid URL; clicks will always open a new window");
                None
            }
        };
        Self {
            site_url: settings.app.site_url.clone(),
            site_origin,
            site_name: settings.app.site_name.clone(),
            tag: n.tag.clone(),
            icon: n.icon.clone(),
            badge: n.badge.clone(),
            seen: FingerprintCache::from_millis(n.dedup_window_ms),
        }
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Handles a push received while no page has focus. Returns the
    /// notification to render, or `None` when the payload duplicates one
    /// rendered inside the dedup window.
    pub fn on_push(&self, payload: &PushPayload, now: DateTime<Utc>) -> Option<OsNotification> {
        let fingerprint = payload.fingerprint(now);
        if !self.seen.admit(&fingerprint, now) {
            debug!(%fingerprint, "Duplicate push ignored");
            return None;
        }

        let data = payload.data.clone().unwrap_or_default();
        let notification = OsNotification {
            title: payload.title().unwrap_or(&self.site_name).to_string(),
            body: payload.body().unwrap_or(DEFAULT_BODY).to_string(),
            icon: self.icon.clone(),
            badge: self.badge.clone(),
            tag: self.tag.clone(),
            renotify: false,
            require_interaction: false,
            silent: false,
            data: NotificationData {
                click_action: data.url.unwrap_or_else(|| self.site_url.clone()),
                priority: data.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
                timestamp: data
                    .timestamp
                    .unwrap_or_else(|| now.timestamp_millis().to_string()),
                announcement: data.announcement,
            },
            actions: vec![
                NotificationAction {
                    action: VIEW_ACTION.to_string(),
                    title: "View".to_string(),
                },
                NotificationAction {
                    action: DISMISS_ACTION.to_string(),
                    title: "Dismiss".to_string(),
                },
            ],
        };
        info!(title = %notification.title, %fingerprint, "Rendering push notification");
        Some(notification)
    }

    /// Turns a push received while a page has focus into a banner message
    /// for that page.
    pub fn on_foreground_push(&self, payload: &PushPayload) -> PageMessage {
        PageMessage::PushReceived {
            title: payload.title().unwrap_or("New Announcement").to_string(),
            body: payload
                .body()
                .map(str::to_string)
                .unwrap_or_else(|| format!("You have a new message from {}", self.site_name)),
        }
    }

    /// Routes a notification click. An open site window is focused and
    /// told to show the announcement; otherwise a new window is opened
    /// with the announcement ID as a deep link.
    pub fn on_click(
        &self,
        action: Option<&str>,
        data: &NotificationData,
        windows: &[WindowClient],
    ) -> ClickOutcome {
        if action == Some(DISMISS_ACTION) {
            return ClickOutcome::Ignore;
        }

        if let Some(window) = windows
            .iter()
            .find(|w| w.focusable && self.is_site_window(&w.url))
        {
            return ClickOutcome::Focus {
                window_id: window.id.clone(),
                message: data
                    .announcement
                    .clone()
                    .map(|announcement| PageMessage::ShowAnnouncement { announcement }),
            };
        }

        ClickOutcome::OpenWindow {
            url: self.deep_link(&data.click_action, data.announcement.as_ref()),
        }
    }

    fn is_site_window(&self, url: &str) -> bool {
        let (Some(site), Ok(candidate)) = (&self.site_origin, Url::parse(url)) else {
            return false;
        };
        site.origin() == candidate.origin()
    }

    fn deep_link(&self, click_action: &str, announcement: Option<&AnnouncementView>) -> String {
        let Some(announcement) = announcement else {
            return click_action.to_string();
        };
        let mut url = match Url::parse(click_action).or_else(|_| Url::parse(&self.site_url)) {
            Ok(url) => url,
            Err(_) => return click_action.to_string(),
        };

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != DEEP_LINK_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        // Re-encodes the other parameters as form data (`%20` becomes `+`).
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(DEEP_LINK_PARAM, &announcement.id);
        url.to_string()
    }
}
