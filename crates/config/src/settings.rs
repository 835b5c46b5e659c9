use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub admin: AdminSettings,
    pub push_relay: PushRelaySettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Public origin of the site; notification clicks only focus windows on it.
    pub site_url: String,
    pub site_name: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PushRelaySettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    pub dedup_window_ms: u64,
    pub closed_limit: usize,
    pub tag: String,
    pub icon: String,
    pub badge: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            dedup_window_ms: 5000,
            closed_limit: 20,
            tag: "herald-announcement".to_string(),
            icon: "/icons/icon-192.png".to_string(),
            badge: "/icons/badge-72.png".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("HERALD"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.site_url", "http://localhost:3000")?
            .set_default("app.site_name", "Herald")?
            .set_default("database.backend", "mongo")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "herald")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.issuer", "herald")?
            .set_default("admin.email", None::<String>)?
            .set_default("admin.password", None::<String>)?
            .set_default("push_relay.base_url", "http://localhost:8787")?
            .set_default("push_relay.api_key", None::<String>)?
            .set_default("push_relay.timeout_secs", 15)?
            .set_default("notifications.dedup_window_ms", 5000)?
            .set_default("notifications.closed_limit", 20)?
            .set_default("notifications.tag", "herald-announcement")?
            .set_default("notifications.icon", "/icons/icon-192.png")?
            .set_default("notifications.badge", "/icons/badge-72.png")?
            .build()?;

        config.try_deserialize()
    }
}
