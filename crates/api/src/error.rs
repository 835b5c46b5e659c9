use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use herald_services::admin::AdminError;
use herald_services::auth::AuthError;
use herald_services::dao::base::DaoError;
use herald_services::push_relay::PushRelayError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Validation(String),
    /// The push relay failed or answered with something unusable.
    BadGateway(String),
    /// An optional integration is not configured.
    ServiceUnavailable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => {
                error!(%msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "push_relay", msg),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) => ApiError::Conflict(msg),
            DaoError::Validation(msg) => ApiError::Validation(msg),
            e if e.is_permission_denied() => ApiError::Forbidden(e.to_string()),
            DaoError::Mongo(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonSer(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::HashError(msg) => ApiError::Internal(msg),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<PushRelayError> for ApiError {
    fn from(err: PushRelayError) -> Self {
        match err {
            PushRelayError::MissingApiKey => ApiError::ServiceUnavailable(err.to_string()),
            _ => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(msg) => ApiError::Validation(msg),
            AdminError::Store(e) => e.into(),
            AdminError::Relay(e) => e.into(),
        }
    }
}
