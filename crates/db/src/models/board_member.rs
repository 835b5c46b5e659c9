use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardMember {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub order: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_active() -> bool {
    true
}

impl BoardMember {
    pub const COLLECTION: &'static str = "board_members";
    pub const DEFAULT_ORDER: i32 = 999;

    /// Members without an explicit position sort last.
    pub fn effective_order(&self) -> i32 {
        match self.order {
            Some(order) if order != 0 => order,
            _ => Self::DEFAULT_ORDER,
        }
    }
}
