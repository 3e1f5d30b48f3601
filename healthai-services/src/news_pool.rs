//! News Pool Builder
//!
//! Builds the deduplicated article pool for one (topic, language) pair by
//! querying the upstream provider across several related search terms and
//! several pages per term, stopping early on clear exhaustion signals.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use healthai_core::Article;
use healthai_news::{GnewsArticle, GnewsClient, NewsError};

/// Paginated upstream article source
///
/// `GnewsClient` is the production implementation; tests substitute
/// scripted fakes so pool building can be exercised without a network.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch one page of search results for a query term
    async fn search(
        &self,
        query: &str,
        language: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<GnewsArticle>, NewsError>;

    /// Fetch trending headlines for a category (fallback path)
    async fn top_headlines(
        &self,
        category: &str,
        language: &str,
        page_size: usize,
    ) -> Result<Vec<GnewsArticle>, NewsError>;
}

#[async_trait]
impl ArticleSource for GnewsClient {
    async fn search(
        &self,
        query: &str,
        language: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<GnewsArticle>, NewsError> {
        GnewsClient::search(self, query, language, page, page_size).await
    }

    async fn top_headlines(
        &self,
        category: &str,
        language: &str,
        page_size: usize,
    ) -> Result<Vec<GnewsArticle>, NewsError> {
        GnewsClient::top_headlines(self, category, language, page_size).await
    }
}

/// Configuration for PoolBuilder
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum pages requested per search term
    pub max_pages_per_term: usize,
    /// Page size requested from the upstream provider
    pub upstream_page_size: usize,
    /// Stop querying further terms once the pool holds this many articles
    pub max_pool_size: usize,
    /// Broader medical terms queried after the requested topic
    pub synonym_terms: Vec<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pages_per_term: 3,
            upstream_page_size: 25,
            max_pool_size: 120,
            synonym_terms: vec![
                "health".to_string(),
                "medicine".to_string(),
                "medical research".to_string(),
                "disease prevention".to_string(),
                "public health".to_string(),
            ],
        }
    }
}

/// Builds deduplicated article pools from an upstream source
///
/// The builder holds no mutable state of its own; every call produces a
/// fresh pool from upstream responses only.
pub struct PoolBuilder<S> {
    source: S,
    config: PoolConfig,
}

impl<S: ArticleSource> PoolBuilder<S> {
    /// Create a builder with the default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, PoolConfig::default())
    }

    /// Create a builder with an explicit configuration
    pub fn with_config(source: S, config: PoolConfig) -> Self {
        Self { source, config }
    }

    /// Build the deduplicated pool for a (topic, language) pair
    ///
    /// Upstream failures abort paging for the failing term only; the build
    /// itself never fails and returns whatever was collected, which may be
    /// empty if the provider is entirely unavailable.
    #[instrument(skip(self))]
    pub async fn build_pool(&self, topic: &str, language: &str) -> Vec<Article> {
        let mut articles: Vec<Article> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for term in self.search_terms(topic) {
            if articles.len() >= self.config.max_pool_size {
                debug!(
                    "Pool reached {} articles, skipping remaining terms",
                    articles.len()
                );
                break;
            }
            self.collect_term(&term, language, &mut articles, &mut seen)
                .await;
        }

        if articles.is_empty() {
            let category = if topic.trim().is_empty() {
                "health"
            } else {
                topic
            };
            debug!(
                "Search terms produced no articles, falling back to top headlines for '{}'",
                category
            );
            match self
                .source
                .top_headlines(category, language, self.config.upstream_page_size)
                .await
            {
                Ok(items) => merge_articles(items, &mut articles, &mut seen),
                Err(e) => warn!("Top headlines fallback failed: {}", e),
            }
        }

        info!(
            "Built pool of {} articles for topic '{}' ({})",
            articles.len(),
            topic,
            language
        );
        articles
    }

    /// Page through one search term, merging into the shared pool
    ///
    /// A short page means the provider has no more results for the term, so
    /// paging stops. A transient short page under-fetches; that is accepted
    /// rather than re-queried.
    async fn collect_term(
        &self,
        term: &str,
        language: &str,
        articles: &mut Vec<Article>,
        seen: &mut HashSet<String>,
    ) {
        for page in 1..=self.config.max_pages_per_term {
            let items = match self
                .source
                .search(term, language, page, self.config.upstream_page_size)
                .await
            {
                Ok(items) => items,
                Err(e) => {
                    warn!("Search '{}' page {} failed: {}", term, page, e);
                    return;
                }
            };

            let received = items.len();
            merge_articles(items, articles, seen);

            if received < self.config.upstream_page_size {
                debug!(
                    "Term '{}' exhausted after page {} ({} items)",
                    term, page, received
                );
                break;
            }
        }
    }

    /// Terms to query: the topic itself plus the configured broader
    /// synonyms, skipping blank entries and case-insensitive repeats.
    fn search_terms(&self, topic: &str) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();

        let topic = topic.trim();
        if !topic.is_empty() {
            terms.push(topic.to_string());
        }

        for synonym in &self.config.synonym_terms {
            let synonym = synonym.trim();
            if synonym.is_empty() {
                continue;
            }
            if terms
                .iter()
                .any(|t| t.eq_ignore_ascii_case(synonym))
            {
                continue;
            }
            terms.push(synonym.to_string());
        }

        terms
    }
}

/// Merge raw provider records into the pool, preserving first-seen order
///
/// Records without a usable identity key are dropped; records whose key was
/// already seen are skipped.
fn merge_articles(
    items: Vec<GnewsArticle>,
    articles: &mut Vec<Article>,
    seen: &mut HashSet<String>,
) {
    for item in items {
        let key = match item.dedupe_key() {
            Some(key) => key.to_string(),
            None => continue,
        };
        if seen.contains(&key) {
            continue;
        }
        seen.insert(key);
        articles.push(item.into_article());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted source keyed by (term, page); unscripted pages are empty
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<(String, usize), Vec<GnewsArticle>>,
        failing: HashSet<(String, usize)>,
        top: Vec<GnewsArticle>,
        search_calls: AtomicUsize,
        top_calls: AtomicUsize,
    }

    impl FakeSource {
        fn page(mut self, term: &str, page: usize, items: Vec<GnewsArticle>) -> Self {
            self.pages.insert((term.to_string(), page), items);
            self
        }

        fn failing_page(mut self, term: &str, page: usize) -> Self {
            self.failing.insert((term.to_string(), page));
            self
        }

        fn top(mut self, items: Vec<GnewsArticle>) -> Self {
            self.top = items;
            self
        }
    }

    #[async_trait]
    impl ArticleSource for FakeSource {
        async fn search(
            &self,
            query: &str,
            _language: &str,
            page: usize,
            _page_size: usize,
        ) -> Result<Vec<GnewsArticle>, NewsError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            let key = (query.to_string(), page);
            if self.failing.contains(&key) {
                return Err(NewsError::RequestFailed("scripted failure".to_string()));
            }
            Ok(self.pages.get(&key).cloned().unwrap_or_default())
        }

        async fn top_headlines(
            &self,
            _category: &str,
            _language: &str,
            _page_size: usize,
        ) -> Result<Vec<GnewsArticle>, NewsError> {
            self.top_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.top.clone())
        }
    }

    fn raw(title: &str, url: &str) -> GnewsArticle {
        GnewsArticle {
            title: title.to_string(),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    fn config(terms: &[&str]) -> PoolConfig {
        PoolConfig {
            synonym_terms: terms.iter().map(|t| t.to_string()).collect(),
            ..PoolConfig::default()
        }
    }

    #[tokio::test]
    async fn duplicates_across_pages_are_kept_once() {
        // Page 1 returns A, B, A; page 2 returns C. Page 1 is full (page
        // size 3) so page 2 is fetched; page 2 is short so paging stops.
        let source = FakeSource::default()
            .page(
                "health",
                1,
                vec![
                    raw("A", "https://n.example/a"),
                    raw("B", "https://n.example/b"),
                    raw("A again", "https://n.example/a"),
                ],
            )
            .page("health", 2, vec![raw("C", "https://n.example/c")]);

        let builder = PoolBuilder::with_config(
            source,
            PoolConfig {
                upstream_page_size: 3,
                synonym_terms: vec![],
                ..PoolConfig::default()
            },
        );

        let pool = builder.build_pool("health", "en").await;

        let titles: Vec<&str> = pool.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn short_first_page_stops_paging_per_term() {
        // Each term returns fewer items than the page size on page 1, so
        // exactly one call is made per term. A provider returning a short
        // page for transient reasons would under-fetch here; that is the
        // accepted trade for bounding upstream calls.
        let source = FakeSource::default()
            .page("health", 1, vec![raw("A", "https://n.example/a")])
            .page("medicine", 1, vec![raw("B", "https://n.example/b")]);

        let builder = PoolBuilder::with_config(source, config(&["medicine"]));
        let pool = builder.build_pool("health", "en").await;

        assert_eq!(pool.len(), 2);
        assert_eq!(builder.source.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_page_aborts_term_but_keeps_collected() {
        // "health" page 1 succeeds and is full, page 2 fails; the term is
        // abandoned but its page 1 articles stay, and the next term runs.
        let source = FakeSource::default()
            .page("health", 1, vec![raw("A", "https://n.example/a")])
            .failing_page("health", 2)
            .page("medicine", 1, vec![raw("B", "https://n.example/b")]);

        let builder = PoolBuilder::with_config(
            source,
            PoolConfig {
                upstream_page_size: 1,
                max_pages_per_term: 3,
                synonym_terms: vec!["medicine".to_string()],
                ..PoolConfig::default()
            },
        );

        let pool = builder.build_pool("health", "en").await;

        let titles: Vec<&str> = pool.iter().map(|a| a.title.as_str()).collect();
        assert!(titles.contains(&"A"));
        assert!(titles.contains(&"B"));
    }

    #[tokio::test]
    async fn empty_build_falls_back_to_top_headlines() {
        let source = FakeSource::default().top(vec![raw("T", "https://n.example/t")]);

        let builder = PoolBuilder::with_config(source, config(&[]));
        let pool = builder.build_pool("health", "en").await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].title, "T");
        assert_eq!(builder.source.top_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_is_skipped_when_search_found_articles() {
        let source = FakeSource::default()
            .page("health", 1, vec![raw("A", "https://n.example/a")])
            .top(vec![raw("T", "https://n.example/t")]);

        let builder = PoolBuilder::with_config(source, config(&[]));
        let pool = builder.build_pool("health", "en").await;

        assert_eq!(pool.len(), 1);
        assert_eq!(builder.source.top_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_call_failing_yields_empty_pool() {
        let source = FakeSource::default()
            .failing_page("health", 1)
            .failing_page("medicine", 1);

        let builder = PoolBuilder::with_config(source, config(&["medicine"]));
        let pool = builder.build_pool("health", "en").await;

        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn records_without_identity_are_dropped() {
        let source = FakeSource::default().page(
            "health",
            1,
            vec![
                GnewsArticle {
                    title: "   ".to_string(),
                    ..Default::default()
                },
                raw("Kept", "https://n.example/kept"),
            ],
        );

        let builder = PoolBuilder::with_config(source, config(&[]));
        let pool = builder.build_pool("health", "en").await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].title, "Kept");
    }

    #[tokio::test]
    async fn pool_cap_stops_further_terms() {
        let source = FakeSource::default()
            .page(
                "health",
                1,
                vec![
                    raw("A", "https://n.example/a"),
                    raw("B", "https://n.example/b"),
                ],
            )
            .page("medicine", 1, vec![raw("C", "https://n.example/c")]);

        let builder = PoolBuilder::with_config(
            source,
            PoolConfig {
                max_pool_size: 2,
                synonym_terms: vec!["medicine".to_string()],
                ..PoolConfig::default()
            },
        );

        let pool = builder.build_pool("health", "en").await;

        assert_eq!(pool.len(), 2);
        assert_eq!(builder.source.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn topic_is_not_queried_twice_when_it_matches_a_synonym() {
        let source = FakeSource::default()
            .page("Health", 1, vec![raw("A", "https://n.example/a")])
            .page("medicine", 1, vec![raw("B", "https://n.example/b")]);

        let builder = PoolBuilder::with_config(source, config(&["health", "medicine"]));
        let pool = builder.build_pool("Health", "en").await;

        // "health" from the synonym list is skipped as a repeat of the topic.
        assert_eq!(pool.len(), 2);
        assert_eq!(builder.source.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn blank_topic_queries_synonyms_only() {
        let source = FakeSource::default().page("health", 1, vec![raw("A", "https://n.example/a")]);

        let builder = PoolBuilder::with_config(source, config(&["health"]));
        let pool = builder.build_pool("  ", "en").await;

        assert_eq!(pool.len(), 1);
        assert_eq!(builder.source.search_calls.load(Ordering::SeqCst), 1);
    }
}
