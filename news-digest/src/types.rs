use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
// Use the interfaces crate for the persisted data contract
pub use interfaces::defs::{AnnotatedRecord, ArticleId, FeedCategory, RawArticle, RECORD_COLUMNS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".to_string(),
            timeout_seconds: 10,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub success: bool,
    pub error: Option<String>,
    pub fetch_time: DateTime<Utc>,
    pub response_time_ms: u64,
    pub http_status: Option<u16>,
    pub content: Option<String>, // RSS/XML content
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug)]
pub struct ParsedEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Relevance tier read from an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relevance {
    High,
    Medium,
    Low,
    Unknown,
}

impl Relevance {
    pub const ALL: [Relevance; 4] = [
        Relevance::High,
        Relevance::Medium,
        Relevance::Low,
        Relevance::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::High => "High",
            Relevance::Medium => "Medium",
            Relevance::Low => "Low",
            Relevance::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relevance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "High" => Ok(Relevance::High),
            "Medium" => Ok(Relevance::Medium),
            "Low" => Ok(Relevance::Low),
            "Unknown" => Ok(Relevance::Unknown),
            other => Err(format!(
                "unknown relevance tier '{}' (expected High, Medium, Low or Unknown)",
                other
            )),
        }
    }
}

/// Reporting period a record is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeBucket {
    Month { year: i32, month: u32 },
    Unknown,
}

impl TimeBucket {
    pub fn month_of(date: DateTime<Utc>) -> Self {
        TimeBucket::Month { year: date.year(), month: date.month() }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(date) => write!(f, "{}", date.format("%B %Y")),
                None => f.write_str("Unknown"),
            },
            TimeBucket::Unknown => f.write_str("Unknown"),
        }
    }
}

impl FromStr for TimeBucket {
    type Err = String;

    /// Accepts the display form, e.g. `October 2026`, or `Unknown`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s == "Unknown" {
            return Ok(TimeBucket::Unknown);
        }
        NaiveDate::parse_from_str(&format!("1 {}", s), "%d %B %Y")
            .map(|date| TimeBucket::Month { year: date.year(), month: date.month() })
            .map_err(|e| format!("invalid month '{}': {}", s, e))
    }
}

/// How the time bucket of an annotated record is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucketPolicy {
    /// Month of the article's publication date.
    #[default]
    Published,
    /// Month of the clock at extraction time, for every annotated record.
    Extraction,
}

/// Reporting fields derived from one annotation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFields {
    pub time_bucket: TimeBucket,
    pub relevance: Relevance,
    pub mentions: Vec<String>,
    pub themes: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Annotation failed: {0}")]
    Annotation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, DigestError>;
