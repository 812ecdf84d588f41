use crate::parser::FeedParser;
use crate::traits::PullFeed;
use crate::types::{DigestError, RawArticle, Result};
use crate::Fetcher;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// A single RSS/Atom feed URL filed under one category.
pub struct RssFeedSource {
    pub url: String,
    pub category: String,
    fetcher: Arc<Fetcher>,
}

impl RssFeedSource {
    pub fn new(url: String, category: String, fetcher: Arc<Fetcher>) -> Self {
        Self { url, category, fetcher }
    }
}

#[async_trait]
impl PullFeed for RssFeedSource {
    fn source_id(&self) -> String {
        format!("rss:{}:{}", self.category, self.url)
    }

    fn category(&self) -> &str {
        &self.category
    }

    async fn pull(&self) -> Result<Vec<RawArticle>> {
        info!("Pulling RSS feed: {}", self.url);

        let fetch_result = self.fetcher.fetch_feed(&self.url).await?;

        if !fetch_result.success {
            let error_msg = fetch_result.error.unwrap_or_else(|| "Fetch failed".to_string());
            return Err(DigestError::General(error_msg));
        }

        let content = match fetch_result.content {
            Some(content) => content,
            None => {
                warn!("No content returned for RSS feed {}", self.url);
                return Ok(Vec::new());
            }
        };

        let parsed_feed = FeedParser::parse_feed(&content)?;
        let articles =
            FeedParser::to_raw_articles(parsed_feed, &self.category, fetch_result.fetch_time);

        info!("Pulled {} articles from RSS feed {}", articles.len(), self.url);
        Ok(articles)
    }
}
