//! Static page content endpoints
//!
//! The frontend renders its pages itself; these return the small JSON
//! bodies it expects when it pings the backend for page copy.

use axum::{response::IntoResponse, routing::get, Json, Router};

use crate::AppState;

/// Create static page routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/report", get(report))
        .route("/about", get(about))
        .route("/analysis", get(analysis))
        .route("/askdoctor", get(askdoctor))
        .route("/contact", get(contact))
}

fn page(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": message }))
}

/// GET /api/ - Landing message
async fn home() -> impl IntoResponse {
    page("Welcome to the HealthAI API")
}

/// GET /api/report - Report page copy
async fn report() -> impl IntoResponse {
    page("Reports are generated on the client from analysis results")
}

/// GET /api/about - About page copy
async fn about() -> impl IntoResponse {
    page("HealthAI provides ML-assisted triage for MRI, kidney and cardiovascular screening")
}

/// GET /api/analysis - Analysis page copy
async fn analysis() -> impl IntoResponse {
    page("Submit data to /api/analysis/ckd/manual, /api/analysis/ckd/file or /api/analysis/ascvd")
}

/// GET /api/askdoctor - Ask-a-doctor page copy
async fn askdoctor() -> impl IntoResponse {
    page("The ask-a-doctor service is not available yet")
}

/// GET /api/contact - Contact page copy
async fn contact() -> impl IntoResponse {
    page("Reach the HealthAI team at support@healthai.example")
}
