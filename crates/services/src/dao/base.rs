use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Validation: {0}")]
    Validation(String),
}

impl DaoError {
    /// Errors that the database raised because the caller lacks rights
    /// on the collection. They are reported to operators verbatim and
    /// never retried.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            DaoError::Mongo(e) => matches!(
                *e.kind,
                mongodb::error::ErrorKind::Command(ref c) if c.code == 13
            ),
            _ => false,
        }
    }
}

pub type DaoResult<T> = Result<T, DaoError>;

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    /// Documents that fail to decode are logged and skipped, so one
    /// malformed record does not hide the rest of the collection.
    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> DaoResult<Vec<T>> {
        let raw = self.collection.clone_with_type::<Document>();
        let cursor = if let Some(sort) = sort {
            raw.find(filter).sort(sort).await?
        } else {
            raw.find(filter).await?
        };

        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(decode_lenient(self.collection.name(), docs))
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self.collection.insert_one(doc).await.map_err(|e| {
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref write_error,
            )) = *e.kind
            {
                if write_error.code == 11000 {
                    return DaoError::DuplicateKey(write_error.message.clone());
                }
            }
            DaoError::Mongo(e)
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::Validation("inserted_id is not an ObjectId".to_string()))?;
        debug!(?id, "Inserted document");
        Ok(id)
    }

    /// Applies `set` as a `$set` on the matching document and stamps
    /// `updated_at`. Returns whether a document matched.
    pub async fn set_fields(&self, filter: Document, mut set: Document) -> DaoResult<bool> {
        set.insert("updated_at", bson::DateTime::now());
        let result = self
            .collection
            .update_one(filter, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn set_by_id(&self, id: ObjectId, set: Document) -> DaoResult<bool> {
        self.set_fields(doc! { "_id": id }, set).await
    }

    pub async fn hard_delete(&self, filter: Document) -> DaoResult<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}

pub fn decode_lenient<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.get("_id").cloned();
            match bson::from_document(doc) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(collection, ?id, error = %e, "Skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}
