use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use herald_services::admin::ProgramDraft;
use herald_services::site::{Listing, ProgramView};

use super::parse_id;
use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

/// Never fails: an empty or unreachable store yields the default programs.
pub async fn list_public(State(state): State<AppState>) -> Json<Listing<ProgramView>> {
    Json(state.site.programs().await)
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AdminUser,
) -> Result<Json<Vec<ProgramView>>, ApiError> {
    let programs = state.admin.list_programs().await?;
    Ok(Json(programs.iter().map(ProgramView::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AdminUser,
    Json(body): Json<ProgramDraft>,
) -> Result<(StatusCode, Json<ProgramView>), ApiError> {
    let program = state.admin.create_program(body).await?;
    Ok((StatusCode::CREATED, Json(ProgramView::from(&program))))
}

pub async fn update(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<ProgramDraft>,
) -> Result<Json<ProgramView>, ApiError> {
    let id = parse_id(&id, "program id")?;
    let program = state.admin.update_program(id, body).await?;
    Ok(Json(ProgramView::from(&program)))
}

pub async fn delete(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id, "program id")?;
    state.admin.delete_program(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
