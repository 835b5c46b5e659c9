use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use herald_db::models::BoardMember;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::{BoardMemberContent, BoardStore};

pub struct BoardMemberDao {
    pub base: BaseDao<BoardMember>,
}

impl BoardMemberDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, BoardMember::COLLECTION),
        }
    }
}

#[async_trait]
impl BoardStore for BoardMemberDao {
    async fn list_all(&self) -> DaoResult<Vec<BoardMember>> {
        // No sort: members written before `order` existed must still load.
        self.base.find_many(doc! {}, None).await
    }

    async fn insert(&self, member: BoardMember) -> DaoResult<BoardMember> {
        let id = self.base.insert_one(&member).await?;
        self.base.find_by_id(id).await
    }

    async fn update(&self, id: ObjectId, content: BoardMemberContent) -> DaoResult<BoardMember> {
        let matched = self
            .base
            .set_by_id(
                id,
                doc! {
                    "name": content.name,
                    "order": content.order,
                    "is_active": true,
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(self.base.hard_delete(doc! { "_id": id }).await? > 0)
    }
}
