//! News Aggregation Cache
//!
//! Process-wide cache mapping (topic, language) to a pool of deduplicated
//! articles. Serves paginated slices and rebuilds a pool only once its TTL
//! has passed, bounding upstream calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use healthai_core::{Article, NewsPage, NewsSource};

use crate::news_pool::{ArticleSource, PoolBuilder};

/// One built pool of deduplicated articles
///
/// Pools are immutable once constructed. Replacement swaps the whole entry,
/// so a reader holding a pool keeps a consistent snapshot even while the
/// cache entry is rebuilt concurrently.
pub struct Pool {
    fetched_at: Instant,
    articles: Vec<Article>,
}

impl Pool {
    fn new(articles: Vec<Article>) -> Self {
        Self {
            fetched_at: Instant::now(),
            articles,
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

/// Configuration for NewsCache
#[derive(Debug, Clone)]
pub struct NewsCacheConfig {
    /// How long a pool stays fresh (in seconds)
    pub pool_ttl_secs: u64,
    /// Largest page size a caller may request
    pub max_page_size: usize,
}

impl Default for NewsCacheConfig {
    fn default() -> Self {
        Self {
            pool_ttl_secs: 300,
            max_page_size: 50,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
}

/// TTL cache over the pool builder
///
/// A failed or empty rebuild is stored fresh like any other, so an upstream
/// outage costs one rebuild per TTL window instead of one per request.
pub struct NewsCache<S> {
    builder: PoolBuilder<S>,
    config: NewsCacheConfig,
    pools: RwLock<HashMap<(String, String), Arc<Pool>>>,
}

impl<S: ArticleSource> NewsCache<S> {
    /// Create a cache with the default configuration
    pub fn new(builder: PoolBuilder<S>) -> Self {
        Self::with_config(builder, NewsCacheConfig::default())
    }

    /// Create a cache with an explicit configuration
    pub fn with_config(builder: PoolBuilder<S>, config: NewsCacheConfig) -> Self {
        Self {
            builder,
            config,
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Serve one page of the pool for a (topic, language) pair
    ///
    /// Assumes `page >= 1` and `1 <= page_size <= max_page_size`; the HTTP
    /// boundary rejects requests outside those ranges before calling in. A
    /// page past the end of the pool yields an empty slice, not an error.
    #[instrument(skip(self))]
    pub async fn get_page(
        &self,
        topic: &str,
        language: &str,
        page: usize,
        page_size: usize,
    ) -> NewsPage {
        let pool = self.fresh_pool(topic, language).await;

        let total = pool.articles.len();
        let start = page.saturating_sub(1).saturating_mul(page_size);
        let end = start.saturating_add(page_size);

        let articles = if start >= total {
            Vec::new()
        } else {
            pool.articles[start..end.min(total)].to_vec()
        };

        NewsPage {
            articles,
            total,
            page,
            has_more: end < total,
        }
    }

    /// Look up a fresh pool for the key, rebuilding if absent or expired
    async fn fresh_pool(&self, topic: &str, language: &str) -> Arc<Pool> {
        let key = (topic.to_string(), language.to_string());
        let ttl = Duration::from_secs(self.config.pool_ttl_secs);

        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(&key) {
                if pool.is_fresh(ttl) {
                    debug!(
                        "Pool cache hit for topic '{}' ({}): {} articles",
                        topic,
                        language,
                        pool.articles.len()
                    );
                    return Arc::clone(pool);
                }
            }
        }

        // Concurrent requests for the same stale key may both rebuild;
        // whichever store lands last wins. Redundant upstream work is
        // bounded and preferred over a lock held across network calls.
        info!("Rebuilding news pool for topic '{}' ({})", topic, language);
        let articles = self.builder.build_pool(topic, language).await;
        let pool = Arc::new(Pool::new(articles));

        {
            let mut pools = self.pools.write().await;
            pools.insert(key, Arc::clone(&pool));
        }

        pool
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let ttl = Duration::from_secs(self.config.pool_ttl_secs);
        let pools = self.pools.read().await;

        let entries = pools.len();
        let fresh = pools.values().filter(|p| p.is_fresh(ttl)).count();

        CacheStats {
            entries,
            fresh,
            stale: entries - fresh,
        }
    }
}

/// Fixed articles served when no upstream API key is configured
///
/// Returned for every topic, language and page, so a missing credential is
/// distinguishable from a legitimately empty pool.
pub fn placeholder_page(page: usize) -> NewsPage {
    let articles = vec![
        Article {
            title: "Staying active protects your heart".to_string(),
            description: Some(
                "Thirty minutes of moderate movement a day lowers cardiovascular risk."
                    .to_string(),
            ),
            url: "https://www.who.int/news-room/fact-sheets/detail/physical-activity".to_string(),
            image: None,
            published_at: None,
            source: NewsSource {
                name: "HealthAI".to_string(),
                url: None,
            },
        },
        Article {
            title: "Know the early signs of kidney disease".to_string(),
            description: Some(
                "Routine blood and urine tests catch chronic kidney disease before symptoms."
                    .to_string(),
            ),
            url: "https://www.who.int/news-room/fact-sheets/detail/chronic-kidney-disease"
                .to_string(),
            image: None,
            published_at: None,
            source: NewsSource {
                name: "HealthAI".to_string(),
                url: None,
            },
        },
        Article {
            title: "Balanced diets beat restrictive fads".to_string(),
            description: Some(
                "Sustained dietary patterns outperform short-term restriction for most adults."
                    .to_string(),
            ),
            url: "https://www.who.int/news-room/fact-sheets/detail/healthy-diet".to_string(),
            image: None,
            published_at: None,
            source: NewsSource {
                name: "HealthAI".to_string(),
                url: None,
            },
        },
    ];

    NewsPage {
        total: articles.len(),
        articles,
        page,
        has_more: false,
    }
}
