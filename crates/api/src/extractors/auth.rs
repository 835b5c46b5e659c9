use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use bson::oid::ObjectId;
use herald_services::auth::Claims;

use crate::{error::ApiError, state::AppState};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated admin, from the Authorization header or the access token
/// cookie.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin_id: ObjectId,
    pub email: String,
    pub claims: Claims,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(ACCESS_TOKEN_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
                    .map(|s| s.to_string())
            })
        })
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = app_state.auth.verify_token(&token)?;

        let admin_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid admin ID in token".to_string()))?;

        Ok(AdminUser {
            admin_id,
            email: claims.email.clone(),
            claims,
        })
    }
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
