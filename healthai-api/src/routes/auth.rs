//! Authentication API endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::routes::{error_response, require_user};
use crate::AppState;

/// Request body for email/password signup
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Request body for email/password login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for Google OAuth login
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub access_token: String,
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/google", post(google_login))
        .route("/auth/me", get(me))
}

/// POST /api/auth/signup - Register a new account
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> impl IntoResponse {
    match state
        .auth_service
        .signup(&body.email, &body.password, &body.full_name)
    {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/auth/login - Exchange credentials for a session
async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> impl IntoResponse {
    match state.auth_service.login(&body.email, &body.password) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/auth/google - Exchange a Google access token for a session
async fn google_login(
    State(state): State<AppState>,
    Json(body): Json<GoogleLoginRequest>,
) -> impl IntoResponse {
    match state.auth_service.google_login(&body.access_token).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/auth/me - Profile of the authenticated user
async fn me(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match require_user(&state, &headers) {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(response) => response,
    }
}
