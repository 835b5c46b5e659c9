use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{Admin, Announcement, BoardMember, Program};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Announcements: the public feed filters on is_active and sorts newest first
    create_indexes(
        db,
        Announcement::COLLECTION,
        vec![
            index(bson::doc! { "is_active": 1, "created_at": -1 }),
            index(bson::doc! { "created_at": -1 }),
        ],
    )
    .await?;

    // Programs
    create_indexes(
        db,
        Program::COLLECTION,
        vec![
            index(bson::doc! { "is_active": 1, "created_at": 1 }),
            index(bson::doc! { "created_at": -1 }),
        ],
    )
    .await?;

    // Board members
    create_indexes(
        db,
        BoardMember::COLLECTION,
        vec![index(bson::doc! { "order": 1 })],
    )
    .await?;

    // Admins
    create_indexes(
        db,
        Admin::COLLECTION,
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
