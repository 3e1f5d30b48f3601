//! HealthAI API Server
//!
//! HTTP API server for the medical triage models, user accounts and the
//! cached health news feed.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

use healthai_inference::{InferenceClient, DEFAULT_INFERENCE_URL};
use healthai_news::GnewsClient;
use healthai_services::{AnalysisService, AuthService, NewsCache, PoolBuilder, UserStore};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// News cache (None when GNEWS_API_KEY is not set - placeholder content served)
    pub news_cache: Option<Arc<NewsCache<GnewsClient>>>,
    pub auth_service: Arc<AuthService>,
    pub analysis_service: Arc<AnalysisService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,healthai_api=debug")),
        )
        .init();

    info!("Starting HealthAI API");

    // Initialize the user store (SQLite database)
    let db_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/healthai.db".to_string());
    info!("Initializing user store at: {}", db_path);
    let store = Arc::new(UserStore::new(&db_path).expect("Failed to initialize user store"));

    // Token signing secret
    let jwt_secret = std::env::var("JWT_SECRET_KEY").unwrap_or_else(|_| {
        warn!("JWT_SECRET_KEY not set - using an insecure development secret");
        "healthai-dev-secret-change-me".to_string()
    });
    let auth_service = Arc::new(AuthService::new(Arc::clone(&store), jwt_secret));

    // Model server client
    let inference_url =
        std::env::var("INFERENCE_URL").unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string());
    info!("Model server endpoint: {}", inference_url);
    let analysis_service = Arc::new(AnalysisService::new(
        InferenceClient::new(inference_url),
        Arc::clone(&store),
    ));

    // News cache - GNEWS_API_KEY is optional, without it the news endpoint
    // serves fixed placeholder content
    let news_cache = match std::env::var("GNEWS_API_KEY") {
        Ok(key) if !key.is_empty() => {
            info!("GNews API key found - live news enabled");
            Some(Arc::new(NewsCache::new(PoolBuilder::new(
                GnewsClient::new(key),
            ))))
        }
        _ => {
            info!("No GNews API key found - news endpoint will serve placeholder content");
            None
        }
    };

    // Create app state
    let state = AppState {
        news_cache,
        auth_service,
        analysis_service,
    };

    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state);

    // Start server
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
