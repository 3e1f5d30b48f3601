//! Business logic services for the HealthAI backend
//!
//! This crate provides the service layer that sits between the HTTP
//! routes and the upstream clients: the news pool and cache, account
//! management, and medical analysis orchestration.

pub mod analysis_service;
pub mod auth_service;
pub mod news_cache;
pub mod news_pool;
pub mod user_store;

pub use analysis_service::AnalysisService;
pub use auth_service::{AuthConfig, AuthService, GoogleUserInfo, Session, TokenClaims};
pub use news_cache::{placeholder_page, CacheStats, NewsCache, NewsCacheConfig};
pub use news_pool::{ArticleSource, PoolBuilder, PoolConfig};
pub use user_store::{NewUser, UserStore, UserStoreError};
