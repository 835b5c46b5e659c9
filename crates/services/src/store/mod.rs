//! Storage seams for the site's document collections.
//!
//! Each collection is reached through an async trait so the same services
//! run against MongoDB in production and against [`memory::MemoryStore`]
//! for local development and the integration suite.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use herald_config::StoreBackend;
use herald_db::models::{Admin, Announcement, BoardMember, Priority, Program};
use mongodb::Database;

use crate::dao::{
    admin::AdminDao, announcement::AnnouncementDao, base::DaoResult,
    board_member::BoardMemberDao, program::ProgramDao,
};

/// Editable part of an announcement. Saving it overwrites every field,
/// so a `None` expiry clears an existing one.
#[derive(Debug, Clone)]
pub struct AnnouncementContent {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub is_active: bool,
    pub expiry_date: Option<DateTime>,
}

/// Delivery audit written after a push attempt.
#[derive(Debug, Clone)]
pub enum PushAudit {
    Sent { recipients: u32, failed: u32, at: DateTime },
    Failed { error: String, at: DateTime },
}

#[derive(Debug, Clone)]
pub struct ProgramContent {
    pub name: String,
    pub timing: String,
    pub icon: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct BoardMemberContent {
    pub name: String,
    pub order: i32,
}

#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// `is_active == true`, newest first.
    async fn list_active(&self) -> DaoResult<Vec<Announcement>>;
    /// Every announcement, newest first.
    async fn list_all(&self) -> DaoResult<Vec<Announcement>>;
    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Announcement>;
    async fn insert(&self, announcement: Announcement) -> DaoResult<Announcement>;
    async fn update_content(&self, id: ObjectId, content: AnnouncementContent) -> DaoResult<Announcement>;
    async fn record_push(&self, id: ObjectId, audit: PushAudit) -> DaoResult<()>;
    async fn delete(&self, id: ObjectId) -> DaoResult<bool>;
}

#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// `is_active == true`, oldest first.
    async fn list_active(&self) -> DaoResult<Vec<Program>>;
    /// Every program, newest first.
    async fn list_all(&self) -> DaoResult<Vec<Program>>;
    async fn insert(&self, program: Program) -> DaoResult<Program>;
    async fn update(&self, id: ObjectId, content: ProgramContent) -> DaoResult<Program>;
    async fn delete(&self, id: ObjectId) -> DaoResult<bool>;
}

#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Unordered; callers sort by [`BoardMember::effective_order`].
    async fn list_all(&self) -> DaoResult<Vec<BoardMember>>;
    async fn insert(&self, member: BoardMember) -> DaoResult<BoardMember>;
    async fn update(&self, id: ObjectId, content: BoardMemberContent) -> DaoResult<BoardMember>;
    async fn delete(&self, id: ObjectId) -> DaoResult<bool>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DaoResult<Admin>;
    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Admin>;
    async fn insert(&self, admin: Admin) -> DaoResult<Admin>;
    async fn count(&self) -> DaoResult<u64>;
    async fn touch_login(&self, id: ObjectId) -> DaoResult<()>;
}

/// Handles to every collection, shared by the services and the API state.
#[derive(Clone)]
pub struct Stores {
    pub announcements: Arc<dyn AnnouncementStore>,
    pub programs: Arc<dyn ProgramStore>,
    pub board: Arc<dyn BoardStore>,
    pub admins: Arc<dyn AdminStore>,
}

impl Stores {
    pub fn mongo(db: &Database) -> Self {
        Self {
            announcements: Arc::new(AnnouncementDao::new(db)),
            programs: Arc::new(ProgramDao::new(db)),
            board: Arc::new(BoardMemberDao::new(db)),
            admins: Arc::new(AdminDao::new(db)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            announcements: store.clone(),
            programs: store.clone(),
            board: store.clone(),
            admins: store,
        }
    }

    pub fn backend_name(backend: StoreBackend) -> &'static str {
        match backend {
            StoreBackend::Mongo => "mongo",
            StoreBackend::Memory => "memory",
        }
    }
}
