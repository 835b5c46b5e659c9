use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use herald_services::admin::BoardMemberDraft;
use herald_services::site::{BoardMemberView, Listing};

use super::parse_id;
use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

pub async fn list_public(State(state): State<AppState>) -> Json<Listing<BoardMemberView>> {
    Json(state.site.board().await)
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AdminUser,
) -> Result<Json<Vec<BoardMemberView>>, ApiError> {
    let members = state.admin.list_board().await?;
    Ok(Json(members.iter().map(BoardMemberView::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    _auth: AdminUser,
    Json(body): Json<BoardMemberDraft>,
) -> Result<(StatusCode, Json<BoardMemberView>), ApiError> {
    let member = state.admin.create_board_member(body).await?;
    Ok((StatusCode::CREATED, Json(BoardMemberView::from(&member))))
}

pub async fn update(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<BoardMemberDraft>,
) -> Result<Json<BoardMemberView>, ApiError> {
    let id = parse_id(&id, "board member id")?;
    let member = state.admin.update_board_member(id, body).await?;
    Ok(Json(BoardMemberView::from(&member)))
}

pub async fn delete(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id, "board member id")?;
    state.admin.delete_board_member(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
