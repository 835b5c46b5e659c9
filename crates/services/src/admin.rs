//! Operator flows behind the admin panel.

use std::sync::Arc;

use bson::{oid::ObjectId, DateTime as BsonDateTime};
use chrono::{DateTime, Utc};
use herald_db::models::{Announcement, BoardMember, Priority, Program};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::dao::DaoError;
use crate::push_relay::{PushRelayClient, PushRelayError, TokenReport, WipeOutcome};
use crate::store::{AnnouncementContent, BoardMemberContent, ProgramContent, PushAudit, Stores};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] DaoError),
    #[error(transparent)]
    Relay(#[from] PushRelayError),
}

fn required(field: &str, value: &str) -> Result<String, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl AnnouncementDraft {
    fn into_content(self) -> Result<AnnouncementContent, AdminError> {
        Ok(AnnouncementContent {
            title: required("title", &self.title)?,
            message: required("message", &self.message)?,
            priority: self.priority,
            is_active: self.is_active,
            expiry_date: self.expiry_date.map(BsonDateTime::from_chrono),
        })
    }
}

/// How the push half of a publish went. Never affects persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushStatus {
    NotRequested,
    Sent { sent: u32, failed: u32 },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub announcement: Announcement,
    pub push: PushStatus,
}

/// Announcement as listed in the admin panel, audit fields included.
#[derive(Debug, Clone, Serialize)]
pub struct AdminAnnouncement {
    pub id: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub priority_label: &'static str,
    pub is_active: bool,
    pub is_expired: bool,
    pub expiry_date: Option<DateTime<Utc>>,
    pub published_by: Option<String>,
    pub push_sent: Option<bool>,
    pub push_sent_at: Option<DateTime<Utc>>,
    pub push_recipients: Option<u32>,
    pub push_failed: Option<u32>,
    pub push_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminAnnouncement {
    pub fn from_model(a: &Announcement, now: DateTime<Utc>) -> Self {
        Self {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: a.title.clone(),
            message: a.message.clone(),
            priority: a.priority,
            priority_label: a.priority.label(),
            is_active: a.is_active,
            is_expired: a.is_expired(BsonDateTime::from_chrono(now)),
            expiry_date: a.expiry_date.map(|d| d.to_chrono()),
            published_by: a.published_by.clone(),
            push_sent: a.push_sent,
            push_sent_at: a.push_sent_at.map(|d| d.to_chrono()),
            push_recipients: a.push_recipients,
            push_failed: a.push_failed,
            push_error: a.push_error.clone(),
            created_at: a.created_at.to_chrono(),
            updated_at: a.last_updated().to_chrono(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramDraft {
    pub name: String,
    pub timing: String,
    pub icon: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl ProgramDraft {
    fn into_content(self) -> Result<ProgramContent, AdminError> {
        Ok(ProgramContent {
            name: required("name", &self.name)?,
            timing: required("timing", &self.timing)?,
            icon: required("icon", &self.icon)?,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardMemberDraft {
    pub name: String,
    #[serde(default)]
    pub order: Option<i32>,
}

impl BoardMemberDraft {
    fn into_content(self) -> Result<BoardMemberContent, AdminError> {
        Ok(BoardMemberContent {
            name: required("name", &self.name)?,
            order: self.order.unwrap_or(BoardMember::DEFAULT_ORDER),
        })
    }
}

pub struct AdminService {
    stores: Stores,
    relay: Arc<PushRelayClient>,
}

impl AdminService {
    pub fn new(stores: Stores, relay: Arc<PushRelayClient>) -> Self {
        Self { stores, relay }
    }

    /// Persists the announcement, then fans out a push when asked and the
    /// announcement is active. A failed push is recorded on the
    /// announcement and reported in the outcome; it never fails the call.
    pub async fn publish(
        &self,
        draft: AnnouncementDraft,
        send_push: bool,
        author: &str,
    ) -> Result<PublishOutcome, AdminError> {
        let content = draft.into_content()?;
        let mut announcement = Announcement::new(
            content.title,
            content.message,
            content.priority,
            content.is_active,
        );
        announcement.expiry_date = content.expiry_date;
        announcement.published_by = Some(author.to_string());

        let announcement = self.stores.announcements.insert(announcement).await?;
        info!(title = %announcement.title, author, "Announcement published");

        if !(send_push && announcement.is_active) {
            return Ok(PublishOutcome {
                announcement,
                push: PushStatus::NotRequested,
            });
        }

        let (push, audit) = match self
            .relay
            .send_push(&announcement.title, &announcement.message, announcement.priority)
            .await
        {
            Ok(outcome) => {
                info!(sent = outcome.sent, failed = outcome.failed, "Push sent");
                (
                    PushStatus::Sent {
                        sent: outcome.sent,
                        failed: outcome.failed,
                    },
                    PushAudit::Sent {
                        recipients: outcome.sent,
                        failed: outcome.failed,
                        at: BsonDateTime::now(),
                    },
                )
            }
            Err(e) => {
                error!(error = %e, "Push failed after announcement was saved");
                (
                    PushStatus::Failed {
                        error: e.to_string(),
                    },
                    PushAudit::Failed {
                        error: e.to_string(),
                        at: BsonDateTime::now(),
                    },
                )
            }
        };

        let announcement = match announcement.id {
            Some(id) => self.record_push(id, audit).await.unwrap_or(announcement),
            None => announcement,
        };
        Ok(PublishOutcome { announcement, push })
    }

    async fn record_push(&self, id: ObjectId, audit: PushAudit) -> Option<Announcement> {
        if let Err(e) = self.stores.announcements.record_push(id, audit).await {
            warn!(id = %id, error = %e, "Failed to record push audit");
            return None;
        }
        self.stores.announcements.find_by_id(id).await.ok()
    }

    pub async fn update(&self, id: ObjectId, draft: AnnouncementDraft) -> Result<Announcement, AdminError> {
        let content = draft.into_content()?;
        Ok(self.stores.announcements.update_content(id, content).await?)
    }

    pub async fn delete(&self, id: ObjectId) -> Result<(), AdminError> {
        if !self.stores.announcements.delete(id).await? {
            return Err(DaoError::NotFound.into());
        }
        info!(id = %id, "Announcement deleted");
        Ok(())
    }

    pub async fn list(&self, now: DateTime<Utc>) -> Result<Vec<AdminAnnouncement>, AdminError> {
        let items = self.stores.announcements.list_all().await?;
        Ok(items
            .iter()
            .map(|a| AdminAnnouncement::from_model(a, now))
            .collect())
    }

    pub async fn list_programs(&self) -> Result<Vec<Program>, AdminError> {
        Ok(self.stores.programs.list_all().await?)
    }

    pub async fn create_program(&self, draft: ProgramDraft) -> Result<Program, AdminError> {
        let content = draft.into_content()?;
        let now = BsonDateTime::now();
        let program = Program {
            id: None,
            name: content.name,
            timing: content.timing,
            icon: content.icon,
            is_active: content.is_active,
            created_at: now,
            updated_at: now,
        };
        Ok(self.stores.programs.insert(program).await?)
    }

    pub async fn update_program(&self, id: ObjectId, draft: ProgramDraft) -> Result<Program, AdminError> {
        let content = draft.into_content()?;
        Ok(self.stores.programs.update(id, content).await?)
    }

    pub async fn delete_program(&self, id: ObjectId) -> Result<(), AdminError> {
        if !self.stores.programs.delete(id).await? {
            return Err(DaoError::NotFound.into());
        }
        Ok(())
    }

    /// Sorted by position.
    pub async fn list_board(&self) -> Result<Vec<BoardMember>, AdminError> {
        let mut members = self.stores.board.list_all().await?;
        members.sort_by_key(BoardMember::effective_order);
        Ok(members)
    }

    pub async fn create_board_member(&self, draft: BoardMemberDraft) -> Result<BoardMember, AdminError> {
        let content = draft.into_content()?;
        let now = BsonDateTime::now();
        let member = BoardMember {
            id: None,
            name: content.name,
            order: Some(content.order),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        Ok(self.stores.board.insert(member).await?)
    }

    pub async fn update_board_member(
        &self,
        id: ObjectId,
        draft: BoardMemberDraft,
    ) -> Result<BoardMember, AdminError> {
        let content = draft.into_content()?;
        Ok(self.stores.board.update(id, content).await?)
    }

    pub async fn delete_board_member(&self, id: ObjectId) -> Result<(), AdminError> {
        if !self.stores.board.delete(id).await? {
            return Err(DaoError::NotFound.into());
        }
        Ok(())
    }

    /// Zero when the relay cannot be asked.
    pub async fn subscriber_count(&self) -> u64 {
        match self.relay.subscriber_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to get subscriber count");
                0
            }
        }
    }

    pub async fn token_report(&self) -> Result<TokenReport, AdminError> {
        let listing = self.relay.debug_tokens().await?;
        Ok(TokenReport::analyze(&listing))
    }

    pub async fn wipe_tokens(&self) -> Result<WipeOutcome, AdminError> {
        let outcome = self.relay.wipe_all_tokens().await?;
        warn!(deleted = outcome.deleted, total = outcome.total, "All push tokens wiped");
        Ok(outcome)
    }

    pub async fn remove_token(&self, user_id: &str) -> Result<bool, AdminError> {
        let user_id = required("user_id", user_id)?;
        Ok(self.relay.remove_token(&user_id).await?)
    }
}
