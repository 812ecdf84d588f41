use crate::types::{RawArticle, Result};
use async_trait::async_trait;

/// Trait for pulling articles from one configured source (an RSS feed, an API, etc.)
#[async_trait]
pub trait PullFeed: Send + Sync {
    /// Unique identifier for this source, used in logs
    fn source_id(&self) -> String;

    /// Category every article from this source is filed under
    fn category(&self) -> &str;

    /// Fetch the current items of the source.
    /// An `Err` means the whole source failed; the caller decides whether to continue.
    async fn pull(&self) -> Result<Vec<RawArticle>>;
}
