//! API route definitions

mod analysis;
mod auth;
mod health;
mod news;
mod pages;
mod rays;

use axum::extract::Multipart;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tracing::error;

use healthai_core::{HealthError, User};

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(news::routes())
        .merge(auth::routes())
        .merge(analysis::routes())
        .merge(rays::routes())
        .merge(pages::routes())
        .merge(health::routes())
}

/// Map a service error onto an HTTP response with a JSON error body
pub(crate) fn error_response(err: HealthError) -> Response {
    let status = match &err {
        HealthError::Auth(_) => StatusCode::UNAUTHORIZED,
        HealthError::Forbidden(_) => StatusCode::FORBIDDEN,
        HealthError::Conflict(_) | HealthError::Validation(_) => StatusCode::BAD_REQUEST,
        HealthError::NotFound(_) => StatusCode::NOT_FOUND,
        HealthError::Api(_) | HealthError::Network(_) | HealthError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
        HealthError::Storage(_) | HealthError::Config(_) | HealthError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    }

    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

/// Extract the bearer token from an Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the authenticated user, failing when the token is missing or invalid
pub(crate) fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, Response> {
    let Some(token) = bearer_token(headers) else {
        return Err(error_response(HealthError::auth("Missing bearer token")));
    };

    state
        .auth_service
        .current_user(token)
        .map_err(error_response)
}

/// Resolve the user when a valid token is present, otherwise stay anonymous
///
/// Analysis endpoints work without an account; a token only adds history
/// recording, so an invalid one falls back to anonymous instead of failing
/// the request.
pub(crate) fn optional_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    let token = bearer_token(headers)?;
    state.auth_service.current_user(token).ok()
}

/// Pull the contents of the `file` field out of a multipart upload
pub(crate) async fn extract_file(multipart: &mut Multipart) -> Result<Vec<u8>, HealthError> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    return field
                        .bytes()
                        .await
                        .map(|bytes| bytes.to_vec())
                        .map_err(|e| {
                            HealthError::validation(format!("Unreadable upload: {}", e))
                        });
                }
            }
            Ok(None) => return Err(HealthError::validation("Expected a 'file' upload field")),
            Err(e) => {
                return Err(HealthError::validation(format!(
                    "Malformed multipart body: {}",
                    e
                )))
            }
        }
    }
}
