use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use herald_db::models::{Admin, Announcement, BoardMember, Program};
use parking_lot::RwLock;

use super::{
    AdminStore, AnnouncementContent, AnnouncementStore, BoardMemberContent, BoardStore,
    ProgramContent, ProgramStore, PushAudit,
};
use crate::dao::base::{DaoError, DaoResult};

/// Process-local store with the same ordering and uniqueness rules as the
/// MongoDB collections. Writes are last-write-wins.
#[derive(Default)]
pub struct MemoryStore {
    announcements: RwLock<Vec<Announcement>>,
    programs: RwLock<Vec<Program>>,
    board: RwLock<Vec<BoardMember>>,
    admins: RwLock<Vec<Admin>>,
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

fn find_mut<T>(items: &mut [T], id: ObjectId, key: impl Fn(&T) -> Option<ObjectId>) -> DaoResult<&mut T> {
    items
        .iter_mut()
        .find(|item| key(item) == Some(id))
        .ok_or(DaoError::NotFound)
}

fn remove<T>(items: &mut Vec<T>, id: ObjectId, key: impl Fn(&T) -> Option<ObjectId>) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != Some(id));
    items.len() != before
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn list_active(&self) -> DaoResult<Vec<Announcement>> {
        let mut items: Vec<_> = self
            .announcements
            .read()
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        newest_first(&mut items, |a| a.created_at);
        Ok(items)
    }

    async fn list_all(&self) -> DaoResult<Vec<Announcement>> {
        let mut items = self.announcements.read().clone();
        newest_first(&mut items, |a| a.created_at);
        Ok(items)
    }

    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Announcement> {
        self.announcements
            .read()
            .iter()
            .find(|a| a.id == Some(id))
            .cloned()
            .ok_or(DaoError::NotFound)
    }

    async fn insert(&self, mut announcement: Announcement) -> DaoResult<Announcement> {
        announcement.id = Some(ObjectId::new());
        self.announcements.write().push(announcement.clone());
        Ok(announcement)
    }

    async fn update_content(&self, id: ObjectId, content: AnnouncementContent) -> DaoResult<Announcement> {
        let mut items = self.announcements.write();
        let a = find_mut(&mut items, id, |a| a.id)?;
        a.title = content.title;
        a.message = content.message;
        a.priority = content.priority;
        a.is_active = content.is_active;
        a.expiry_date = content.expiry_date;
        a.updated_at = Some(DateTime::now());
        Ok(a.clone())
    }

    async fn record_push(&self, id: ObjectId, audit: PushAudit) -> DaoResult<()> {
        let mut items = self.announcements.write();
        let a = find_mut(&mut items, id, |a| a.id)?;
        match audit {
            PushAudit::Sent { recipients, failed, at } => {
                a.push_sent = Some(true);
                a.push_sent_at = Some(at);
                a.push_recipients = Some(recipients);
                a.push_failed = Some(failed);
            }
            PushAudit::Failed { error, at } => {
                a.push_sent = Some(false);
                a.push_error = Some(error);
                a.push_attempted_at = Some(at);
            }
        }
        a.updated_at = Some(DateTime::now());
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(remove(&mut self.announcements.write(), id, |a| a.id))
    }
}

#[async_trait]
impl ProgramStore for MemoryStore {
    async fn list_active(&self) -> DaoResult<Vec<Program>> {
        let mut items: Vec<_> = self
            .programs
            .read()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        items.sort_by_key(|p| p.created_at);
        Ok(items)
    }

    async fn list_all(&self) -> DaoResult<Vec<Program>> {
        let mut items = self.programs.read().clone();
        newest_first(&mut items, |p| p.created_at);
        Ok(items)
    }

    async fn insert(&self, mut program: Program) -> DaoResult<Program> {
        program.id = Some(ObjectId::new());
        self.programs.write().push(program.clone());
        Ok(program)
    }

    async fn update(&self, id: ObjectId, content: ProgramContent) -> DaoResult<Program> {
        let mut items = self.programs.write();
        let p = find_mut(&mut items, id, |p| p.id)?;
        p.name = content.name;
        p.timing = content.timing;
        p.icon = content.icon;
        p.is_active = content.is_active;
        p.updated_at = DateTime::now();
        Ok(p.clone())
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(remove(&mut self.programs.write(), id, |p| p.id))
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn list_all(&self) -> DaoResult<Vec<BoardMember>> {
        Ok(self.board.read().clone())
    }

    async fn insert(&self, mut member: BoardMember) -> DaoResult<BoardMember> {
        member.id = Some(ObjectId::new());
        self.board.write().push(member.clone());
        Ok(member)
    }

    async fn update(&self, id: ObjectId, content: BoardMemberContent) -> DaoResult<BoardMember> {
        let mut items = self.board.write();
        let m = find_mut(&mut items, id, |m| m.id)?;
        m.name = content.name;
        m.order = Some(content.order);
        m.is_active = true;
        m.updated_at = DateTime::now();
        Ok(m.clone())
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(remove(&mut self.board.write(), id, |m| m.id))
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> DaoResult<Admin> {
        self.admins
            .read()
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or(DaoError::NotFound)
    }

    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Admin> {
        self.admins
            .read()
            .iter()
            .find(|a| a.id == Some(id))
            .cloned()
            .ok_or(DaoError::NotFound)
    }

    async fn insert(&self, mut admin: Admin) -> DaoResult<Admin> {
        let mut admins = self.admins.write();
        if admins.iter().any(|a| a.email.eq_ignore_ascii_case(&admin.email)) {
            return Err(DaoError::DuplicateKey(format!("admin {} already exists", admin.email)));
        }
        admin.id = Some(ObjectId::new());
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn count(&self) -> DaoResult<u64> {
        Ok(self.admins.read().len() as u64)
    }

    async fn touch_login(&self, id: ObjectId) -> DaoResult<()> {
        let mut admins = self.admins.write();
        let a = find_mut(&mut admins, id, |a| a.id)?;
        a.last_login_at = Some(DateTime::now());
        Ok(())
    }
}
