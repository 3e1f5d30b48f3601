//! Medical analysis API endpoints

use axum::{
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use healthai_core::{CardioInput, CkdInput, HealthError, HealthResult};

use crate::routes::{error_response, extract_file, optional_user, require_user};
use crate::AppState;

/// Query parameters for the analysis history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of records to return
    pub limit: Option<usize>,
}

/// Create analysis routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/ckd/manual", get(ckd_manual))
        .route("/analysis/ckd/file", post(ckd_file))
        .route("/analysis/ascvd", post(ascvd))
        .route("/analysis/history", get(history))
}

/// GET /api/analysis/ckd/manual - CKD analysis from query parameters
async fn ckd_manual(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(input): Query<CkdInput>,
) -> impl IntoResponse {
    let user = optional_user(&state, &headers);
    match state
        .analysis_service
        .analyze_ckd(user.as_ref(), &input)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/analysis/ckd/file - CKD analysis from an uploaded CSV
///
/// The CSV must carry a header row naming the renal panel fields; values are
/// read from the first data row.
async fn ckd_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let user = optional_user(&state, &headers);

    let input = match extract_file(&mut multipart).await.and_then(|bytes| {
        let text = String::from_utf8(bytes)
            .map_err(|_| HealthError::validation("CSV file is not valid UTF-8"))?;
        parse_ckd_csv(&text)
    }) {
        Ok(input) => input,
        Err(e) => return error_response(e),
    };

    match state
        .analysis_service
        .analyze_ckd(user.as_ref(), &input)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/analysis/ascvd - Cardiovascular risk analysis
async fn ascvd(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CardioInput>,
) -> impl IntoResponse {
    let user = optional_user(&state, &headers);
    match state
        .analysis_service
        .analyze_cardio(user.as_ref(), &input)
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/analysis/history - Recent analyses of the authenticated user
async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryQuery>,
) -> impl IntoResponse {
    let user = match require_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let limit = params.limit.unwrap_or(20).min(100);
    match state.analysis_service.history(&user, limit) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Parse a renal panel from CSV text (header row plus first data row)
///
/// Column matching is case-insensitive and ignores surrounding whitespace,
/// so spreadsheet exports with capitalized headers still parse.
fn parse_ckd_csv(text: &str) -> HealthResult<CkdInput> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| HealthError::validation("CSV file is empty"))?;
    let row = lines
        .next()
        .ok_or_else(|| HealthError::validation("CSV file has no data row"))?;

    let columns: Vec<String> = header
        .trim_start_matches('\u{feff}')
        .split(',')
        .map(|column| column.trim().to_lowercase())
        .collect();
    let values: Vec<&str> = row.split(',').map(str::trim).collect();

    let field = |name: &str| -> HealthResult<f64> {
        let index = columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| {
                HealthError::validation(format!("CSV is missing a '{}' column", name))
            })?;
        let raw = values.get(index).ok_or_else(|| {
            HealthError::validation(format!("CSV row has no value for '{}'", name))
        })?;
        raw.parse().map_err(|_| {
            HealthError::validation(format!("CSV value for '{}' is not a number: {}", name, raw))
        })
    };

    Ok(CkdInput {
        gfr: field("gfr")?,
        serum_creatinine: field("serum_creatinine")?,
        bun: field("bun")?,
        serum_calcium: field("serum_calcium")?,
        urine_ph: field("urine_ph")?,
        blood_pressure: field("blood_pressure")?,
        c3_c4: field("c3_c4")?,
        oxalate_levels: field("oxalate_levels")?,
    })
}
