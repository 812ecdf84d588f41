use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured group of feeds. Categories keep the order they were declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCategory {
    pub category: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// One item read from a feed, before it is sent for annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub link: String,
    pub category: String,
    /// Feed description, already cut to 300 characters.
    pub description: String,
    /// Publication date as the feed reported it, empty when absent.
    pub published_at: String,
    pub fetched_at: DateTime<Utc>,
}

/// Content fingerprint of an article, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The unit of persistence: an article plus the annotation text exactly as the
/// text service returned it. Reporting fields are never stored, they are
/// re-derived from `gpt_summary` whenever the record is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub id: ArticleId,
    pub original_title: String,
    pub link: String,
    pub category: String,
    pub gpt_summary: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Column order shared by the record store and the export file.
pub const RECORD_COLUMNS: [&str; 5] = ["id", "original_title", "link", "category", "gpt_summary"];

// Object style note:
// Records are written once and never updated. Anything that needs a view of
// them (filters, counts, exports) takes a slice and returns new values instead
// of holding on to the collection.
