use crate::extract::FieldExtractor;
use crate::types::{AnnotatedRecord, DerivedFields, Relevance};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub const TOP_MENTIONS: usize = 5;
pub const TOP_THEMES: usize = 10;

/// Category and relevance selection applied to a month of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub categories: BTreeSet<String>,
    pub tiers: BTreeSet<Relevance>,
}

impl ReportFilter {
    pub fn new<C, T>(categories: C, tiers: T) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        T: IntoIterator<Item = Relevance>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            tiers: tiers.into_iter().collect(),
        }
    }

    /// Tiers selected when the user hasn't picked any.
    pub fn default_tiers() -> [Relevance; 2] {
        [Relevance::High, Relevance::Medium]
    }

    /// Every category present in `records`, with the default tiers.
    pub fn for_records(records: &[AnnotatedRecord]) -> Self {
        Self::new(categories(records), Self::default_tiers())
    }

    pub fn matches(&self, record: &AnnotatedRecord, derived: &DerivedFields) -> bool {
        self.categories.contains(&record.category) && self.tiers.contains(&derived.relevance)
    }

    /// Records passing both predicates, in their original order.
    pub fn apply(
        &self,
        extractor: &FieldExtractor,
        records: &[AnnotatedRecord],
    ) -> Vec<AnnotatedRecord> {
        let kept: Vec<AnnotatedRecord> = records
            .iter()
            .filter(|record| self.matches(record, &extractor.derive(record)))
            .cloned()
            .collect();
        debug!("Filter kept {}/{} records", kept.len(), records.len());
        kept
    }
}

/// Distinct categories in first-seen order.
pub fn categories(records: &[AnnotatedRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.contains(&record.category) {
            seen.push(record.category.clone());
        }
    }
    seen
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedToken {
    pub token: String,
    pub count: usize,
}

/// Totals and rankings over a filtered set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub high_relevance_count: usize,
    pub top_mentions: Vec<RankedToken>,
    pub top_themes: Vec<RankedToken>,
}

pub fn summarize(extractor: &FieldExtractor, records: &[AnnotatedRecord]) -> ReportSummary {
    let mut high_relevance_count = 0;
    let mut mentions: Vec<String> = Vec::new();
    let mut themes: Vec<String> = Vec::new();

    for record in records {
        let derived = extractor.derive(record);
        if derived.relevance == Relevance::High {
            high_relevance_count += 1;
        }
        mentions.extend(derived.mentions);
        themes.extend(derived.themes);
    }

    ReportSummary {
        total: records.len(),
        high_relevance_count,
        top_mentions: rank_top(&mentions, TOP_MENTIONS),
        top_themes: rank_top(&themes, TOP_THEMES),
    }
}

/// The `n` most frequent tokens. Equal counts keep the order in which the
/// tokens were first seen.
pub fn rank_top(tokens: &[String], n: usize) -> Vec<RankedToken> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for token in tokens {
        let count = counts.entry(token.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(token.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<(usize, &str, usize)> = first_seen
        .iter()
        .enumerate()
        .map(|(position, token)| (position, *token, counts[token]))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(n)
        .map(|(_, token, count)| RankedToken { token: token.to_string(), count })
        .collect()
}
