use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use herald_db::models::Announcement;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::{AnnouncementContent, AnnouncementStore, PushAudit};

pub struct AnnouncementDao {
    pub base: BaseDao<Announcement>,
}

impl AnnouncementDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Announcement::COLLECTION),
        }
    }
}

#[async_trait]
impl AnnouncementStore for AnnouncementDao {
    async fn list_active(&self) -> DaoResult<Vec<Announcement>> {
        self.base
            .find_many(doc! { "is_active": true }, Some(doc! { "created_at": -1 }))
            .await
    }

    async fn list_all(&self) -> DaoResult<Vec<Announcement>> {
        self.base
            .find_many(doc! {}, Some(doc! { "created_at": -1 }))
            .await
    }

    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Announcement> {
        self.base.find_by_id(id).await
    }

    async fn insert(&self, announcement: Announcement) -> DaoResult<Announcement> {
        let id = self.base.insert_one(&announcement).await?;
        self.base.find_by_id(id).await
    }

    async fn update_content(
        &self,
        id: ObjectId,
        content: AnnouncementContent,
    ) -> DaoResult<Announcement> {
        let matched = self
            .base
            .set_by_id(
                id,
                doc! {
                    "title": content.title,
                    "message": content.message,
                    "priority": content.priority.as_str(),
                    "is_active": content.is_active,
                    "expiry_date": content.expiry_date,
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    async fn record_push(&self, id: ObjectId, audit: PushAudit) -> DaoResult<()> {
        let set = match audit {
            PushAudit::Sent { recipients, failed, at } => doc! {
                "push_sent": true,
                "push_sent_at": at,
                "push_recipients": recipients as i64,
                "push_failed": failed as i64,
            },
            PushAudit::Failed { error, at } => doc! {
                "push_sent": false,
                "push_error": error,
                "push_attempted_at": at,
            },
        };
        if !self.base.set_by_id(id, set).await? {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(self.base.hard_delete(doc! { "_id": id }).await? > 0)
    }
}
