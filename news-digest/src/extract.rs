//! Field extraction from annotation text.
//!
//! The annotation is free text that is only expected to follow a labeled-line
//! layout (`Title:`, `Summary:`, `Relevance to Arm:`, `Company/Industry Mentions:`).
//! Every extractor here is total: text that doesn't follow the layout gives the
//! field's default value, and each field is read independently of the others.

use crate::stopwords::is_stop_word;
use crate::types::{AnnotatedRecord, DerivedFields, Relevance, TimeBucket, TimeBucketPolicy};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Label whose presence marks an annotation as complete.
pub const RELEVANCE_LABEL: &str = "Relevance to Arm:";

/// Lines mentioning any of these are mined for theme tokens.
pub const THEME_KEYWORDS: [&str; 8] = [
    "net zero",
    "scope",
    "emission",
    "datacenter",
    "energy",
    "regulation",
    "supply chain",
    "ai",
];

const NULL_MENTIONS: [&str; 4] = ["n/a", "none", "", "unknown"];

static RELEVANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Relevance to Arm:[ \t]*(High|Medium|Low)").expect("valid regex")
});

static MENTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:Company|Competitor|Industry)[^\n:]*:(.*)$").expect("valid regex")
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-zA-Z]{4,}\b").expect("valid regex")
});

/// Derives reporting fields from stored records.
///
/// The reference clock is fixed at construction so that a whole report is
/// computed against one "now".
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    policy: TimeBucketPolicy,
    now: DateTime<Utc>,
}

impl FieldExtractor {
    pub fn new(policy: TimeBucketPolicy, now: DateTime<Utc>) -> Self {
        Self { policy, now }
    }

    pub fn time_bucket(&self, record: &AnnotatedRecord) -> TimeBucket {
        extract_time_bucket(
            &record.gpt_summary,
            record.published_at.as_deref(),
            self.policy,
            self.now,
        )
    }

    pub fn derive(&self, record: &AnnotatedRecord) -> DerivedFields {
        DerivedFields {
            time_bucket: self.time_bucket(record),
            relevance: extract_relevance(&record.gpt_summary),
            mentions: extract_mentions(&record.gpt_summary),
            themes: extract_themes(&record.gpt_summary),
        }
    }
}

/// Reporting month of an annotation.
///
/// Without the relevance label the annotation is treated as incomplete and
/// lands in `Unknown` under either policy.
pub fn extract_time_bucket(
    raw: &str,
    published_at: Option<&str>,
    policy: TimeBucketPolicy,
    now: DateTime<Utc>,
) -> TimeBucket {
    if !raw.contains(RELEVANCE_LABEL) {
        return TimeBucket::Unknown;
    }

    match policy {
        TimeBucketPolicy::Extraction => TimeBucket::month_of(now),
        TimeBucketPolicy::Published => published_at
            .and_then(parse_published)
            .map(TimeBucket::month_of)
            .unwrap_or(TimeBucket::Unknown),
    }
}

/// Parse a feed publication date. RSS uses RFC 2822, Atom uses RFC 3339.
pub fn parse_published(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn extract_relevance(raw: &str) -> Relevance {
    RELEVANCE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|tier| tier.as_str().parse().ok())
        .unwrap_or(Relevance::Unknown)
}

/// Entity names from the first `Company`/`Competitor`/`Industry` line that
/// has something after its colon. Labeled lines left empty are passed over.
///
/// Order and duplicates are kept; counting happens in the aggregator.
pub fn extract_mentions(raw: &str) -> Vec<String> {
    let Some(rest) = MENTIONS_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|rest| !rest.trim().is_empty())
    else {
        return Vec::new();
    };

    rest.split(',')
        .map(str::trim)
        .filter(|token| !NULL_MENTIONS.contains(&token.to_lowercase().as_str()))
        .map(str::to_string)
        .collect()
}

pub fn extract_themes(raw: &str) -> Vec<String> {
    let mut themes = Vec::new();

    for line in raw.lines() {
        let lower = line.to_lowercase();
        if !THEME_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            continue;
        }
        themes.extend(
            WORD_RE
                .find_iter(line)
                .map(|word| word.as_str().to_lowercase())
                .filter(|word| !is_stop_word(word)),
        );
    }

    themes
}

/// Text following the first `Summary:` label, or the whole annotation when
/// there is none.
pub fn summary_excerpt(raw: &str) -> &str {
    match raw.split_once("Summary:") {
        Some((_, rest)) => rest.trim(),
        None => raw.trim(),
    }
}
