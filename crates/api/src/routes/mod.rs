pub mod announcement;
pub mod auth;
pub mod board;
pub mod program;
pub mod push;

use bson::oid::ObjectId;

use crate::error::ApiError;

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {what}")))
}
