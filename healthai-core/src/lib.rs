//! Core types for the HealthAI backend
//!
//! This crate defines the shared data structures used across the backend,
//! including news articles, analysis inputs/reports, and user records.

pub mod analysis;
pub mod error;
pub mod news;
pub mod user;

pub use analysis::{
    AnalysisKind, CardioInput, CardioReport, CkdInput, CkdReport, MriReport, Recommendation,
};
pub use error::{HealthError, HealthResult};
pub use news::{Article, NewsPage, NewsSource};
pub use user::{AnalysisRecord, User, UserProfile};
