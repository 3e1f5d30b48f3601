//! Wire types for the GNews v4 API

use serde::Deserialize;

use healthai_core::{Article, NewsSource};

/// Top-level response from `/search` and `/top-headlines`
#[derive(Debug, Clone, Deserialize)]
pub struct GnewsResponse {
    /// Total matches upstream claims to have (not the page size)
    #[serde(rename = "totalArticles", default)]
    pub total_articles: u64,
    #[serde(default)]
    pub articles: Vec<GnewsArticle>,
}

/// One article record as returned by GNews
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GnewsArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Some provider payloads carry `link` instead of `url`
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<GnewsSource>,
}

/// Source block nested in each article record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GnewsSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl GnewsArticle {
    /// Identity key for deduplication: URL, else alternate link, else title.
    ///
    /// Returns `None` when the record has no usable identity at all, in
    /// which case it must be dropped from aggregation.
    pub fn dedupe_key(&self) -> Option<&str> {
        [
            self.url.as_deref(),
            self.link.as_deref(),
            Some(self.title.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
    }

    /// Convert into the core article shape served to clients
    pub fn into_article(self) -> Article {
        let url = self.url.or(self.link).unwrap_or_default();

        let source = self
            .source
            .and_then(|s| {
                let name = s.name.unwrap_or_default();
                if name.trim().is_empty() {
                    None
                } else {
                    Some(NewsSource { name, url: s.url })
                }
            })
            .unwrap_or_else(|| source_from_url(&url));

        Article {
            title: self.title,
            description: self.description.filter(|d| !d.trim().is_empty()),
            url,
            image: self.image.filter(|i| !i.trim().is_empty()),
            published_at: self.published_at,
            source,
        }
    }
}

/// Derive source information from the article URL host
fn source_from_url(url: &str) -> NewsSource {
    let parsed = url::Url::parse(url).ok();

    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str())
        .unwrap_or("Unknown");

    // Clean up the host name for display
    let name = host
        .strip_prefix("www.")
        .unwrap_or(host)
        .split('.')
        .next()
        .unwrap_or(host);

    // Capitalize first letter
    let name = match name.chars().next() {
        Some(first) => format!("{}{}", first.to_uppercase(), &name[first.len_utf8()..]),
        None => "Unknown".to_string(),
    };

    let base_url = parsed
        .as_ref()
        .map(|u| format!("{}://{}", u.scheme(), u.host_str().unwrap_or("")));

    NewsSource {
        name,
        url: base_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_key_prefers_url() {
        let article = GnewsArticle {
            title: "Title".to_string(),
            url: Some("https://a.example/story".to_string()),
            link: Some("https://b.example/story".to_string()),
            ..Default::default()
        };
        assert_eq!(article.dedupe_key(), Some("https://a.example/story"));
    }

    #[test]
    fn dedupe_key_falls_back_to_link_then_title() {
        let article = GnewsArticle {
            title: "Only a title".to_string(),
            link: Some("https://b.example/story".to_string()),
            ..Default::default()
        };
        assert_eq!(article.dedupe_key(), Some("https://b.example/story"));

        let article = GnewsArticle {
            title: "Only a title".to_string(),
            ..Default::default()
        };
        assert_eq!(article.dedupe_key(), Some("Only a title"));
    }

    #[test]
    fn dedupe_key_is_none_for_blank_identity() {
        let article = GnewsArticle {
            title: "   ".to_string(),
            url: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(article.dedupe_key(), None);
    }

    #[test]
    fn into_article_keeps_provider_source() {
        let article = GnewsArticle {
            title: "Measles outbreak contained".to_string(),
            url: Some("https://www.reuters.com/health/measles".to_string()),
            source: Some(GnewsSource {
                name: Some("Reuters Health".to_string()),
                url: Some("https://www.reuters.com".to_string()),
            }),
            ..Default::default()
        };
        let converted = article.into_article();
        assert_eq!(converted.source.name, "Reuters Health");
        assert_eq!(converted.url, "https://www.reuters.com/health/measles");
    }

    #[test]
    fn into_article_derives_source_from_host() {
        let article = GnewsArticle {
            title: "New trial results".to_string(),
            url: Some("https://www.reuters.com/health/trial".to_string()),
            ..Default::default()
        };
        let converted = article.into_article();
        assert_eq!(converted.source.name, "Reuters");
        assert_eq!(
            converted.source.url.as_deref(),
            Some("https://www.reuters.com")
        );
    }

    #[test]
    fn into_article_drops_blank_description_and_image() {
        let article = GnewsArticle {
            title: "Headline".to_string(),
            url: Some("https://example.com/a".to_string()),
            description: Some("  ".to_string()),
            image: Some("".to_string()),
            ..Default::default()
        };
        let converted = article.into_article();
        assert!(converted.description.is_none());
        assert!(converted.image.is_none());
    }
}
