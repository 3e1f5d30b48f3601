//! GNews API client

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::NewsError;
use crate::types::{GnewsArticle, GnewsResponse};

/// Base URL for the GNews v4 API
const GNEWS_API_BASE: &str = "https://gnews.io/api/v4";

/// GNews API client
///
/// One instance is shared for the process lifetime; construction requires an
/// API key, so the absence of a key is decided by the caller before a client
/// ever exists.
pub struct GnewsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GnewsClient {
    /// Create a new GNews client
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GNEWS_API_BASE)
    }

    /// Create a client against a custom base URL (used by tests)
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.into(),
        }
    }

    /// Search articles for one query term
    ///
    /// `page` is 1-based; `page_size` maps to the provider's `max` parameter.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        language: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<GnewsArticle>, NewsError> {
        let url = format!(
            "{}/search?q={}&lang={}&page={}&max={}&apikey={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(language),
            page,
            page_size,
            self.api_key
        );

        let articles = self.fetch(&url).await?;
        debug!(
            "GNews search '{}' (lang={}, page={}) returned {} articles",
            query,
            language,
            page,
            articles.len()
        );
        Ok(articles)
    }

    /// Fetch trending headlines for a category
    #[instrument(skip(self))]
    pub async fn top_headlines(
        &self,
        category: &str,
        language: &str,
        page_size: usize,
    ) -> Result<Vec<GnewsArticle>, NewsError> {
        let url = format!(
            "{}/top-headlines?category={}&lang={}&max={}&apikey={}",
            self.base_url,
            urlencoding::encode(category),
            urlencoding::encode(language),
            page_size,
            self.api_key
        );

        let articles = self.fetch(&url).await?;
        debug!(
            "GNews top-headlines '{}' (lang={}) returned {} articles",
            category,
            language,
            articles.len()
        );
        Ok(articles)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<GnewsArticle>, NewsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(NewsError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: GnewsResponse = response
            .json()
            .await
            .map_err(|e| NewsError::ParseError(e.to_string()))?;

        Ok(parsed.articles)
    }
}
