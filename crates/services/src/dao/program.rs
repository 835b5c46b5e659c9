use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use herald_db::models::Program;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::{ProgramContent, ProgramStore};

pub struct ProgramDao {
    pub base: BaseDao<Program>,
}

impl ProgramDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Program::COLLECTION),
        }
    }
}

#[async_trait]
impl ProgramStore for ProgramDao {
    async fn list_active(&self) -> DaoResult<Vec<Program>> {
        self.base
            .find_many(doc! { "is_active": true }, Some(doc! { "created_at": 1 }))
            .await
    }

    async fn list_all(&self) -> DaoResult<Vec<Program>> {
        self.base
            .find_many(doc! {}, Some(doc! { "created_at": -1 }))
            .await
    }

    async fn insert(&self, program: Program) -> DaoResult<Program> {
        let id = self.base.insert_one(&program).await?;
        self.base.find_by_id(id).await
    }

    async fn update(&self, id: ObjectId, content: ProgramContent) -> DaoResult<Program> {
        let matched = self
            .base
            .set_by_id(
                id,
                doc! {
                    "name": content.name,
                    "timing": content.timing,
                    "icon": content.icon,
                    "is_active": content.is_active,
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
