//! Imaging (MRI) API endpoints

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::routes::{error_response, extract_file, optional_user};
use crate::AppState;

/// Create imaging routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rays", get(rays_info))
        .route("/rays/mri", post(classify_mri))
}

/// GET /api/rays - Landing message for the imaging section
async fn rays_info() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Upload a brain MRI image to /api/rays/mri for classification"
    }))
}

/// POST /api/rays/mri - Classify an uploaded brain MRI image
async fn classify_mri(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let user = optional_user(&state, &headers);

    let image = match extract_file(&mut multipart).await {
        Ok(image) => image,
        Err(e) => return error_response(e),
    };

    match state
        .analysis_service
        .analyze_mri(user.as_ref(), &image)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}
