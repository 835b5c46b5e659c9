use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use herald_services::push_relay::{TokenReport, WipeOutcome};
use herald_services::site::VisitorSubscription;
use serde::Serialize;

use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub subscriber_count: u64,
    pub relay_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenReportResponse {
    pub report: TokenReport,
    pub text: String,
}

/// Visitor self-registration; no admin token required.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<VisitorSubscription>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.visitor_id.trim().is_empty() || body.token.trim().is_empty() {
        return Err(ApiError::Validation(
            "visitor_id and token are required".to_string(),
        ));
    }
    state.site.subscribe(body, Utc::now()).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn stats(State(state): State<AppState>, _auth: AdminUser) -> Json<StatsResponse> {
    Json(StatsResponse {
        subscriber_count: state.admin.subscriber_count().await,
        relay_configured: state.relay.has_api_key(),
    })
}

pub async fn tokens(
    State(state): State<AppState>,
    _auth: AdminUser,
) -> Result<Json<TokenReportResponse>, ApiError> {
    let report = state.admin.token_report().await?;
    let text = report.render();
    Ok(Json(TokenReportResponse { report, text }))
}

pub async fn wipe(
    State(state): State<AppState>,
    auth: AdminUser,
) -> Result<Json<WipeOutcome>, ApiError> {
    tracing::warn!(admin = %auth.email, "Wiping all push tokens");
    Ok(Json(state.admin.wipe_tokens().await?))
}

pub async fn remove(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state.admin.remove_token(&user_id).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
