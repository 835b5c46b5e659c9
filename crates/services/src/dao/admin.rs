use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use herald_db::models::Admin;
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::store::AdminStore;

pub struct AdminDao {
    pub base: BaseDao<Admin>,
}

impl AdminDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Admin::COLLECTION),
        }
    }
}

#[async_trait]
impl AdminStore for AdminDao {
    async fn find_by_email(&self, email: &str) -> DaoResult<Admin> {
        self.base
            .find_one(doc! { "email": email.to_lowercase() })
            .await?
            .ok_or(DaoError::NotFound)
    }

    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Admin> {
        self.base.find_by_id(id).await
    }

    async fn insert(&self, mut admin: Admin) -> DaoResult<Admin> {
        admin.email = admin.email.to_lowercase();
        let id = self.base.insert_one(&admin).await?;
        self.base.find_by_id(id).await
    }

    async fn count(&self) -> DaoResult<u64> {
        self.base.count(doc! {}).await
    }

    async fn touch_login(&self, id: ObjectId) -> DaoResult<()> {
        // Admin documents carry no updated_at, so bypass set_by_id.
        self.base
            .collection()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_login_at": DateTime::now() } },
            )
            .await?;
        Ok(())
    }
}
