//! Which announcement a visitor sees.
//!
//! The feed is split in two: every valid announcement feeds the bell
//! counter, and the subset the visitor has not closed is ranked for
//! auto-display.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use herald_db::models::{Announcement, Priority};
use serde::{Deserialize, Serialize};

/// Announcement as served to the public site and carried in push data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementView {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AnnouncementView {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }

    pub fn is_displayable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

impl From<&Announcement> for AnnouncementView {
    fn from(a: &Announcement) -> Self {
        Self {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: a.title.clone(),
            message: a.message.clone(),
            priority: a.priority,
            is_active: a.is_active,
            expiry_date: a.expiry_date.map(|d| d.to_chrono()),
            created_at: a.created_at.to_chrono(),
        }
    }
}

/// Higher priority first, then newer first.
pub fn rank(a: &AnnouncementView, b: &AnnouncementView) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn ranked(mut items: Vec<AnnouncementView>) -> Vec<AnnouncementView> {
    items.sort_by(rank);
    items
}

#[derive(Debug, Clone, Default)]
pub struct Feed {
    all_valid: Vec<AnnouncementView>,
    candidates: Vec<AnnouncementView>,
}

impl Feed {
    /// `fetched` is expected newest first; `closed` holds IDs the visitor
    /// dismissed in this browser.
    pub fn build(fetched: Vec<AnnouncementView>, closed: &[String], now: DateTime<Utc>) -> Self {
        let all_valid: Vec<_> = fetched
            .into_iter()
            .filter(|a| a.is_displayable(now))
            .collect();

        let candidates = ranked(
            all_valid
                .iter()
                .filter(|a| !closed.contains(&a.id))
                .cloned()
                .collect(),
        );

        Self {
            all_valid,
            candidates,
        }
    }

    pub fn auto_display(&self) -> Option<&AnnouncementView> {
        self.candidates.first()
    }

    /// Closed announcements still count here.
    pub fn bell_count(&self) -> usize {
        self.all_valid.len()
    }

    pub fn bell_pick(&self) -> Option<&AnnouncementView> {
        best(&self.all_valid)
    }

    pub fn all_valid(&self) -> &[AnnouncementView] {
        &self.all_valid
    }

    pub fn candidates(&self) -> &[AnnouncementView] {
        &self.candidates
    }

    pub fn into_all_valid(self) -> Vec<AnnouncementView> {
        self.all_valid
    }
}

pub fn best(items: &[AnnouncementView]) -> Option<&AnnouncementView> {
    items.iter().min_by(|a, b| rank(a, b))
}
