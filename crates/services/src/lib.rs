pub mod admin;
pub mod auth;
pub mod dao;
pub mod display;
pub mod manager;
pub mod notify;
pub mod push_relay;
pub mod selection;
pub mod site;
pub mod site_client;
pub mod store;

pub use admin::AdminService;
pub use auth::AuthService;
pub use dao::*;
pub use display::{DisplayState, MemoryStateStore, StateStore};
pub use manager::{AnnouncementManager, AnnouncementSource, Phase, StoreSource};
pub use notify::BackgroundHandler;
pub use push_relay::{PushRelayClient, PushRelayError};
pub use selection::{AnnouncementView, Feed};
pub use site::SiteService;
pub use site_client::SiteClient;
pub use store::Stores;
