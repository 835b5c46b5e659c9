//! Page-side announcement controller.
//!
//! The page runtime owns one [`AnnouncementManager`] and drives it from its
//! own event listeners: page load, modal buttons, the bell and messages
//! from the background handler. Rendering reads [`AnnouncementManager::current`]
//! and [`AnnouncementManager::phase`] after each call.

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dao::DaoError;
use crate::display::{DisplayState, StateStore};
use crate::notify::handler::{BANNER_TTL, DEEP_LINK_PARAM};
use crate::notify::{Banner, PageMessage};
use crate::selection::{rank, AnnouncementView, Feed};
use crate::store::AnnouncementStore;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Store error: {0}")]
    Store(#[from] DaoError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(u16),
}

/// Where the page reads announcements from.
#[async_trait]
pub trait AnnouncementSource: Send + Sync {
    /// Active announcements. Callers apply expiry and ranking.
    async fn fetch_active(&self) -> Result<Vec<AnnouncementView>, SourceError>;
    async fn fetch_by_id(&self, id: &str) -> Result<Option<AnnouncementView>, SourceError>;
}

/// Reads straight from the announcement store.
pub struct StoreSource {
    store: Arc<dyn AnnouncementStore>,
}

impl StoreSource {
    pub fn new(store: Arc<dyn AnnouncementStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AnnouncementSource for StoreSource {
    async fn fetch_active(&self) -> Result<Vec<AnnouncementView>, SourceError> {
        let items = self.store.list_active().await?;
        Ok(items.iter().map(AnnouncementView::from).collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<AnnouncementView>, SourceError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        match self.store.find_by_id(oid).await {
            Ok(a) => Ok(Some(AnnouncementView::from(&a))),
            Err(DaoError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    /// Modal open.
    Shown,
    /// Collapsed to the floating button.
    Minimized,
    Closed,
}

/// What the page should do after a background message.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEffect {
    Shown(AnnouncementView),
    Banner(Banner),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeepLink {
    /// URL to put back in the address bar.
    pub cleaned_url: String,
    pub shown: bool,
}

pub struct AnnouncementManager<Src, S> {
    source: Src,
    state: DisplayState<S>,
    current: Option<AnnouncementView>,
    phase: Phase,
    available: Vec<AnnouncementView>,
}

impl<Src: AnnouncementSource, S: StateStore> AnnouncementManager<Src, S> {
    pub fn new(source: Src, state: DisplayState<S>) -> Self {
        Self {
            source,
            state,
            current: None,
            phase: Phase::Hidden,
            available: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&AnnouncementView> {
        self.current.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &DisplayState<S> {
        &self.state
    }

    /// Valid announcements behind the bell, closed ones included.
    pub fn available(&self) -> &[AnnouncementView] {
        &self.available
    }

    pub fn bell_count(&self) -> usize {
        self.available.len()
    }

    /// Fetches and auto-displays the best announcement the visitor has not
    /// closed. A fetch failure is logged and leaves the page as it was.
    pub async fn load_active(&mut self, now: DateTime<Utc>) -> Option<&AnnouncementView> {
        let fetched = match self.source.fetch_active().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Failed to load announcements");
                return None;
            }
        };

        let feed = Feed::build(fetched, &self.state.closed_ids(), now);
        let pick = feed.auto_display().cloned();
        self.available = feed.into_all_valid();
        debug!(available = self.available.len(), "Announcements loaded");

        if let Some(announcement) = pick {
            self.display(announcement);
        }
        self.current.as_ref()
    }

    /// Shows an announcement, restoring the minimized form if the visitor
    /// left it that way.
    fn display(&mut self, announcement: AnnouncementView) {
        self.phase = if self.state.is_minimized(&announcement.id) {
            Phase::Minimized
        } else {
            Phase::Shown
        };
        self.current = Some(announcement);
    }

    /// Shows an announcement as an open modal regardless of the closed
    /// list or a saved minimized flag.
    fn force_show(&mut self, announcement: AnnouncementView) {
        self.state.set_minimized(&announcement.id, false);
        info!(id = %announcement.id, "Showing announcement");
        self.current = Some(announcement);
        self.phase = Phase::Shown;
    }

    pub fn minimize(&mut self) -> bool {
        let (Phase::Shown, Some(a)) = (self.phase, &self.current) else {
            return false;
        };
        self.state.set_minimized(&a.id, true);
        self.phase = Phase::Minimized;
        true
    }

    pub fn expand(&mut self) -> bool {
        let (Phase::Minimized, Some(a)) = (self.phase, &self.current) else {
            return false;
        };
        self.state.set_minimized(&a.id, false);
        self.phase = Phase::Shown;
        true
    }

    /// Terminal for this announcement in this browser.
    pub fn close(&mut self) -> bool {
        if !matches!(self.phase, Phase::Shown | Phase::Minimized) {
            return false;
        }
        let Some(a) = self.current.take() else {
            return false;
        };
        self.state.close(&a.id);
        self.phase = Phase::Closed;
        true
    }

    /// Reopens the current announcement, or else the best valid one even
    /// if the visitor closed it earlier.
    pub fn bell_clicked(&mut self, now: DateTime<Utc>) -> Option<&AnnouncementView> {
        if let Some(current) = self.current.clone() {
            self.force_show(current);
            return self.current.as_ref();
        }

        let pick = self
            .available
            .iter()
            .filter(|a| a.is_displayable(now))
            .min_by(|a, b| rank(a, b))
            .cloned()?;
        self.force_show(pick);
        self.current.as_ref()
    }

    /// Fetches one announcement and shows it if it is still active and
    /// unexpired. Closed announcements are not filtered.
    pub async fn show_specific(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.source.fetch_by_id(id).await {
            Ok(Some(a)) if a.is_displayable(now) => {
                self.force_show(a);
                true
            }
            Ok(Some(_)) => {
                debug!(id, "Linked announcement is inactive or expired");
                false
            }
            Ok(None) => {
                debug!(id, "Linked announcement does not exist");
                false
            }
            Err(e) => {
                warn!(id, error = %e, "Failed to load linked announcement");
                false
            }
        }
    }

    /// Consumes the `showAnnouncement` query parameter, if present.
    pub async fn consume_deep_link(&mut self, url: &str, now: DateTime<Utc>) -> DeepLink {
        let unchanged = DeepLink {
            cleaned_url: url.to_string(),
            shown: false,
        };
        let Ok(mut parsed) = Url::parse(url) else {
            return unchanged;
        };

        let mut id = None;
        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter_map(|(k, v)| {
                if k == DEEP_LINK_PARAM {
                    id.get_or_insert_with(|| v.to_string());
                    None
                } else {
                    Some((k.into_owned(), v.into_owned()))
                }
            })
            .collect();
        let Some(id) = id else {
            return unchanged;
        };

        // Kept pairs are re-serialized as form data, so `%20` comes back
        // as `+`. The cleaned URL is equivalent but not byte-identical.
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }

        let shown = self.show_specific(&id, now).await;
        DeepLink {
            cleaned_url: parsed.to_string(),
            shown,
        }
    }

    pub fn handle_page_message(&mut self, message: PageMessage) -> PageEffect {
        match message {
            PageMessage::ShowAnnouncement { announcement } => {
                self.force_show(announcement.clone());
                PageEffect::Shown(announcement)
            }
            PageMessage::PushReceived { title, body } => PageEffect::Banner(Banner {
                title,
                message: body,
                ttl: BANNER_TTL,
            }),
        }
    }
}
