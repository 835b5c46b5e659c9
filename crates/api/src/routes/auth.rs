use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
};
use chrono::{DateTime, Utc};
use herald_db::models::Admin;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::auth::{ACCESS_TOKEN_COOKIE, AdminUser},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub admin: AdminResponse,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&Admin> for AdminResponse {
    fn from(a: &Admin) -> Self {
        Self {
            id: a.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: a.email.clone(),
            created_at: a.created_at.to_chrono(),
            last_login_at: a.last_login_at.map(|d| d.to_chrono()),
        }
    }
}

fn cookie_header(value: String) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&value)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie: {e}")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let (admin, token) = state
        .auth
        .login(state.stores.admins.as_ref(), &body.email, &body.password)
        .await?;
    info!(email = %admin.email, "Admin logged in");

    let headers = cookie_header(format!(
        "{ACCESS_TOKEN_COOKIE}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        token.access_token, token.expires_in
    ))?;

    Ok((
        headers,
        Json(AuthResponse {
            access_token: token.access_token,
            expires_in: token.expires_in,
            admin: AdminResponse::from(&admin),
        }),
    ))
}

pub async fn logout() -> Result<(HeaderMap, Json<serde_json::Value>), ApiError> {
    let headers = cookie_header(format!(
        "{ACCESS_TOKEN_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0"
    ))?;
    Ok((headers, Json(serde_json::json!({ "success": true }))))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AdminUser,
) -> Result<Json<AdminResponse>, ApiError> {
    let admin = state.stores.admins.find_by_id(auth.admin_id).await?;
    Ok(Json(AdminResponse::from(&admin)))
}
