pub mod admin;
pub mod announcement;
pub mod board_member;
pub mod program;

pub use admin::*;
pub use announcement::*;
pub use board_member::*;
pub use program::*;
