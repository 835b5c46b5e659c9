use serde::{Deserialize, Serialize};

use crate::selection::AnnouncementView;

/// Messages posted from the background context to an open page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageMessage {
    /// Force-display this announcement, bypassing the closed list.
    ShowAnnouncement { announcement: AnnouncementView },
    /// A push arrived while the page had focus; show it as a banner.
    PushReceived { title: String, body: String },
}
