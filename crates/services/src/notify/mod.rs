//! Push delivery on the visitor's device: the background handler that
//! turns relay payloads into OS notifications, the dedup window guarding
//! it, and the typed messages it exchanges with open pages.

pub mod dedup;
pub mod handler;
pub mod message;
pub mod payload;

pub use dedup::FingerprintCache;
pub use handler::{BackgroundHandler, Banner, ClickOutcome, OsNotification, WindowClient};
pub use message::PageMessage;
pub use payload::PushPayload;
