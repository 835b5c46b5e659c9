use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use herald_services::admin::{AdminAnnouncement, AnnouncementDraft, PushStatus};
use herald_services::selection::AnnouncementView;
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::{error::ApiError, extractors::auth::AdminUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(flatten)]
    pub announcement: AnnouncementDraft,
    #[serde(default)]
    pub send_push: bool,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub announcement: AdminAnnouncement,
    pub push: PushStatus,
}

/// Active, unexpired announcements, best first.
pub async fn list_public(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementView>>, ApiError> {
    Ok(Json(state.site.announcements(Utc::now()).await?))
}

pub async fn get_public(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementView>, ApiError> {
    let id = parse_id(&id, "announcement id")?;
    state
        .site
        .announcement(id, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Announcement not found".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AdminUser,
) -> Result<Json<Vec<AdminAnnouncement>>, ApiError> {
    Ok(Json(state.admin.list(Utc::now()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AdminUser,
    Json(body): Json<PublishRequest>,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let outcome = state
        .admin
        .publish(body.announcement, body.send_push, &auth.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            announcement: AdminAnnouncement::from_model(&outcome.announcement, Utc::now()),
            push: outcome.push,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
    Json(body): Json<AnnouncementDraft>,
) -> Result<Json<AdminAnnouncement>, ApiError> {
    let id = parse_id(&id, "announcement id")?;
    let updated = state.admin.update(id, body).await?;
    Ok(Json(AdminAnnouncement::from_model(&updated, Utc::now())))
}

pub async fn delete(
    State(state): State<AppState>,
    _auth: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id, "announcement id")?;
    state.admin.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
