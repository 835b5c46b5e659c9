pub mod admin;
pub mod announcement;
pub mod base;
pub mod board_member;
pub mod program;

pub use base::{BaseDao, DaoError, DaoResult};
