pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(parsed)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me));

    // Public site
    let announcement_routes = Router::new()
        .route("/", get(routes::announcement::list_public))
        .route("/{announcement_id}", get(routes::announcement::get_public));

    let push_routes = Router::new().route("/subscribe", post(routes::push::subscribe));

    // Admin panel
    let admin_announcement_routes = Router::new()
        .route("/", get(routes::announcement::list))
        .route("/", post(routes::announcement::create))
        .route("/{announcement_id}", put(routes::announcement::update))
        .route("/{announcement_id}", delete(routes::announcement::delete));

    let admin_program_routes = Router::new()
        .route("/", get(routes::program::list))
        .route("/", post(routes::program::create))
        .route("/{program_id}", put(routes::program::update))
        .route("/{program_id}", delete(routes::program::delete));

    let admin_board_routes = Router::new()
        .route("/", get(routes::board::list))
        .route("/", post(routes::board::create))
        .route("/{member_id}", put(routes::board::update))
        .route("/{member_id}", delete(routes::board::delete));

    let admin_push_routes = Router::new()
        .route("/stats", get(routes::push::stats))
        .route("/tokens", get(routes::push::tokens))
        .route("/tokens", delete(routes::push::wipe))
        .route("/tokens/{user_id}", delete(routes::push::remove));

    let admin = Router::new()
        .nest("/announcement", admin_announcement_routes)
        .nest("/program", admin_program_routes)
        .nest("/board", admin_board_routes)
        .nest("/push", admin_push_routes);

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/announcement", announcement_routes)
        .route("/program", get(routes::program::list_public))
        .route("/board", get(routes::board::list_public))
        .nest("/push", push_routes)
        .nest("/admin", admin);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
