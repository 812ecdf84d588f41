use crate::config::DigestConfig;
use crate::sources::RssFeedSource;
use crate::traits::PullFeed;
use crate::types::{RawArticle, Result};
use crate::Fetcher;
use std::sync::Arc;
use tracing::{info, warn};

/// Walks every configured source in declaration order.
pub struct FeedReader {
    sources: Vec<Box<dyn PullFeed>>,
}

impl FeedReader {
    pub fn new(sources: Vec<Box<dyn PullFeed>>) -> Self {
        Self { sources }
    }

    /// One RSS source per configured URL, sharing a single fetcher.
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(config.fetch.clone())?);
        let sources = config
            .feeds
            .iter()
            .flat_map(|group| {
                let fetcher = fetcher.clone();
                group.urls.iter().map(move |url| {
                    let source =
                        RssFeedSource::new(url.clone(), group.category.clone(), fetcher.clone());
                    Box::new(source) as Box<dyn PullFeed>
                })
            })
            .collect();
        Ok(Self::new(sources))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Pull every source. A failing source is logged and contributes nothing.
    pub async fn read_all(&self) -> Vec<RawArticle> {
        let mut articles = Vec::new();
        let mut failed = 0;

        for source in &self.sources {
            match source.pull().await {
                Ok(items) => articles.extend(items),
                Err(e) => {
                    failed += 1;
                    warn!("Skipping source {}: {}", source.source_id(), e);
                }
            }
        }

        info!(
            "Read {} articles from {} sources ({} failed)",
            articles.len(),
            self.sources.len(),
            failed
        );
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DigestError;
    use async_trait::async_trait;
    use chrono::Utc;

    struct StaticSource {
        category: String,
        titles: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl PullFeed for StaticSource {
        fn source_id(&self) -> String {
            format!("static:{}", self.category)
        }

        fn category(&self) -> &str {
            &self.category
        }

        async fn pull(&self) -> Result<Vec<RawArticle>> {
            if self.fail {
                return Err(DigestError::General("unreachable".to_string()));
            }
            Ok(self
                .titles
                .iter()
                .map(|title| RawArticle {
                    title: title.to_string(),
                    link: format!("https://example.com/{}", title),
                    category: self.category.clone(),
                    description: String::new(),
                    published_at: String::new(),
                    fetched_at: Utc::now(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn failing_source_does_not_stop_the_walk() {
        let reader = FeedReader::new(vec![
            Box::new(StaticSource {
                category: "a".into(),
                titles: vec!["one", "two"],
                fail: false,
            }),
            Box::new(StaticSource { category: "b".into(), titles: vec![], fail: true }),
            Box::new(StaticSource { category: "c".into(), titles: vec!["three"], fail: false }),
        ]);
        let titles: Vec<String> = reader.read_all().await.into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[test]
    fn one_source_per_configured_url() {
        let config = DigestConfig::from_toml_str(
            "[[feeds]]\ncategory = \"x\"\n\
             urls = [\"https://a.example/rss\", \"https://b.example/rss\"]\n",
        )
        .expect("config");
        assert_eq!(FeedReader::from_config(&config).expect("reader").source_count(), 2);
    }
}
