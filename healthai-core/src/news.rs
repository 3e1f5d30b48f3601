//! News data structures for the aggregated health feed

use serde::{Deserialize, Serialize};

/// Source of a news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    /// Name of the news source (e.g., "Reuters", "BBC")
    pub name: String,
    /// URL of the source's website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A single news article served to the frontend
///
/// Field names on the wire follow the upstream provider's shape so the
/// frontend can render articles without remapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Article title
    pub title: String,
    /// Brief summary/excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical article URL (the deduplication identity)
    pub url: String,
    /// Article thumbnail/image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Publication date as provided upstream (RFC 3339 string)
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Source information
    pub source: NewsSource,
}

/// One page of the aggregated news feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPage {
    /// Articles for the requested page, in pool order
    pub articles: Vec<Article>,
    /// Total number of articles in the underlying pool
    pub total: usize,
    /// The page number that was served (1-based)
    pub page: usize,
    /// Whether pages beyond this one exist
    pub has_more: bool,
}
