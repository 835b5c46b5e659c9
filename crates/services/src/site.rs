//! Read side of the public site.

use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use herald_db::models::{BoardMember, Program};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dao::{DaoError, DaoResult};
use crate::push_relay::{PushRelayClient, PushRelayError, TokenRegistration};
use crate::selection::{ranked, AnnouncementView};
use crate::store::Stores;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramView {
    pub id: String,
    pub name: String,
    pub timing: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Program> for ProgramView {
    fn from(p: &Program) -> Self {
        Self {
            id: p.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: p.name.clone(),
            timing: p.timing.clone(),
            icon: p.icon.clone(),
            is_active: p.is_active,
            created_at: Some(p.created_at.to_chrono()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardMemberView {
    pub id: String,
    pub name: String,
    pub order: i32,
}

impl From<&BoardMember> for BoardMemberView {
    fn from(m: &BoardMember) -> Self {
        Self {
            id: m.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: m.name.clone(),
            order: m.effective_order(),
        }
    }
}

/// A public list. `fallback` is set when the items are the built-in
/// defaults rather than stored data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub fallback: bool,
}

impl<T> Listing<T> {
    fn stored(items: Vec<T>) -> Self {
        Self { items, fallback: false }
    }
}

fn fallback_programs() -> Vec<ProgramView> {
    [
        ("Weekly Study Circle", "Daily after sunset", "fas fa-sun"),
        ("Community Lecture", "Thursdays at 7 PM", "fas fa-calendar-week"),
        ("Family Night", "3rd Saturday monthly", "fas fa-users"),
    ]
    .into_iter()
    .map(|(name, timing, icon)| ProgramView {
        id: String::new(),
        name: name.to_string(),
        timing: timing.to_string(),
        icon: icon.to_string(),
        is_active: true,
        created_at: None,
    })
    .collect()
}

/// Visitor push opt-in as posted by the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorSubscription {
    pub visitor_id: String,
    pub token: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

pub struct SiteService {
    stores: Stores,
    relay: Arc<PushRelayClient>,
}

impl SiteService {
    pub fn new(stores: Stores, relay: Arc<PushRelayClient>) -> Self {
        Self { stores, relay }
    }

    /// Active, unexpired announcements, best first.
    pub async fn announcements(&self, now: DateTime<Utc>) -> DaoResult<Vec<AnnouncementView>> {
        let items = self.stores.announcements.list_active().await?;
        Ok(ranked(
            items
                .iter()
                .map(AnnouncementView::from)
                .filter(|a| a.is_displayable(now))
                .collect(),
        ))
    }

    /// `None` for unknown, inactive or expired announcements.
    pub async fn announcement(&self, id: ObjectId, now: DateTime<Utc>) -> DaoResult<Option<AnnouncementView>> {
        match self.stores.announcements.find_by_id(id).await {
            Ok(a) => Ok(Some(AnnouncementView::from(&a)).filter(|v| v.is_displayable(now))),
            Err(DaoError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn programs(&self) -> Listing<ProgramView> {
        match self.stores.programs.list_active().await {
            Ok(items) if !items.is_empty() => {
                Listing::stored(items.iter().map(ProgramView::from).collect())
            }
            Ok(_) => Listing {
                items: fallback_programs(),
                fallback: true,
            },
            Err(e) => {
                warn!(error = %e, "Failed to load programs, serving defaults");
                Listing {
                    items: fallback_programs(),
                    fallback: true,
                }
            }
        }
    }

    pub async fn board(&self) -> Listing<BoardMemberView> {
        match self.stores.board.list_all().await {
            Ok(mut items) if !items.is_empty() => {
                items.sort_by_key(BoardMember::effective_order);
                Listing::stored(items.iter().map(BoardMemberView::from).collect())
            }
            Ok(_) => Listing {
                items: Vec::new(),
                fallback: true,
            },
            Err(e) => {
                warn!(error = %e, "Failed to load board members");
                Listing {
                    items: Vec::new(),
                    fallback: true,
                }
            }
        }
    }

    pub async fn subscribe(
        &self,
        subscription: VisitorSubscription,
        now: DateTime<Utc>,
    ) -> Result<(), PushRelayError> {
        let registration = TokenRegistration {
            user_id: subscription.visitor_id,
            fcm_token: subscription.token,
            user_type: Some("visitor".to_string()),
            subscribed_at: Some(now.to_rfc3339()),
            user_agent: subscription.user_agent,
        };
        self.relay.store_token(&registration).await?;
        info!(visitor_id = %registration.user_id, "Visitor subscribed to push");
        Ok(())
    }
}
