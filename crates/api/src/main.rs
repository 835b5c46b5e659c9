use herald_api::{build_router, state::AppState};
use herald_config::{Settings, StoreBackend};
use herald_db::{connect, indexes::ensure_indexes};
use herald_services::Stores;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "herald_api=debug,herald_services=debug,herald_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!(
        site = %settings.app.site_name,
        backend = Stores::backend_name(settings.database.backend),
        "Starting Herald API on {}:{}",
        settings.app.host,
        settings.app.port
    );

    let stores = match settings.database.backend {
        StoreBackend::Mongo => {
            let db = connect(&settings).await?;
            ensure_indexes(&db).await?;
            Stores::mongo(&db)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Stores::memory()
        }
    };

    let app_state = AppState::new(stores, settings.clone())?;

    if app_state
        .auth
        .bootstrap_admin(app_state.stores.admins.as_ref(), &settings.admin)
        .await?
    {
        info!("Admin account created from configuration");
    }
    if !app_state.relay.has_api_key() {
        warn!("Push relay API key not set; admin push operations are disabled");
    }

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
