use crate::types::{DigestError, ParsedEntry, ParsedFeed, RawArticle, Result};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use tracing::{debug, info};

/// Feed descriptions are cut to this many characters on ingestion.
pub const DESCRIPTION_LIMIT: usize = 300;

pub struct FeedParser;

impl FeedParser {
    pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| DigestError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);
        let total = feed.entries.len();
        let entries: Vec<ParsedEntry> =
            feed.entries.into_iter().filter_map(Self::parse_entry).collect();

        info!(
            "Parsed feed with {} usable entries ({} discarded)",
            entries.len(),
            total - entries.len()
        );

        Ok(ParsedFeed { title, entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> Option<ParsedEntry> {
        let title = entry.title.map(|t| t.content.trim().to_string()).unwrap_or_default();

        let raw_link = entry.links.first().map(|l| l.href.as_str()).unwrap_or("");
        let Some(link) = normalize_link(raw_link) else {
            debug!("Skipping entry '{}' with unusable link '{}'", title, raw_link);
            return None;
        };

        let description = entry
            .summary
            .map(|s| truncate_chars(s.content.trim(), DESCRIPTION_LIMIT))
            .unwrap_or_default();

        Some(ParsedEntry {
            title,
            link,
            description,
            published_at: entry.published.or(entry.updated),
        })
    }

    /// Attach category and fetch time to every entry.
    pub fn to_raw_articles(
        parsed_feed: ParsedFeed,
        category: &str,
        fetched_at: DateTime<Utc>,
    ) -> Vec<RawArticle> {
        parsed_feed
            .entries
            .into_iter()
            .map(|entry| RawArticle {
                title: entry.title,
                link: entry.link,
                category: category.to_string(),
                description: entry.description,
                published_at: entry.published_at.map(|dt| dt.to_rfc2822()).unwrap_or_default(),
                fetched_at,
            })
            .collect()
    }
}

/// Clean up a feed link. Empty links and links without `http` are rejected;
/// links that mention `http` but don't start with it get an `https://` prefix.
pub fn normalize_link(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() || !link.contains("http") {
        return None;
    }
    if link.starts_with("http") {
        Some(link.to_string())
    } else {
        Some(format!("https://{}", link))
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
