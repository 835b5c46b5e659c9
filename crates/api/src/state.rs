use std::sync::Arc;

use herald_config::Settings;
use herald_services::{
    AdminService, AuthService, PushRelayClient, PushRelayError, SiteService, Stores,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stores: Stores,
    pub auth: Arc<AuthService>,
    pub relay: Arc<PushRelayClient>,
    pub site: Arc<SiteService>,
    pub admin: Arc<AdminService>,
}

impl AppState {
    pub fn new(stores: Stores, settings: Settings) -> Result<Self, PushRelayError> {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let relay = Arc::new(PushRelayClient::new(&settings.push_relay)?);
        let site = Arc::new(SiteService::new(stores.clone(), relay.clone()));
        let admin = Arc::new(AdminService::new(stores.clone(), relay.clone()));

        Ok(Self {
            settings,
            stores,
            auth,
            relay,
            site,
            admin,
        })
    }
}
