//! News feed API endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use healthai_services::{placeholder_page, NewsCacheConfig};

use crate::AppState;

/// Query parameters for the news feed
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Topic to aggregate articles for
    pub category: Option<String>,
    /// Two-letter language code
    pub lang: Option<String>,
    /// 1-based page number
    pub page: Option<usize>,
    /// Articles per page
    pub page_size: Option<usize>,
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/news", get(get_news))
}

/// GET /api/news - Serve one page of the cached article pool
async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> impl IntoResponse {
    let category = params.category.unwrap_or_else(|| "health".to_string());
    let lang = params.lang.unwrap_or_else(|| "en".to_string());
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(9);

    let max_page_size = NewsCacheConfig::default().max_page_size;
    if page < 1 || page_size < 1 || page_size > max_page_size {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!(
                    "page must be >= 1 and page_size between 1 and {}",
                    max_page_size
                )
            })),
        )
            .into_response();
    }

    let news_page = match &state.news_cache {
        Some(cache) => cache.get_page(&category, &lang, page, page_size).await,
        None => placeholder_page(page),
    };

    (StatusCode::OK, Json(news_page)).into_response()
}
