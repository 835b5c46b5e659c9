use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub timing: String,
    /// Icon class name, e.g. `fas fa-sun`.
    pub icon: String,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Program {
    pub const COLLECTION: &'static str = "programs";
}
