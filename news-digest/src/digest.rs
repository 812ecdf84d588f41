use crate::extract::{summary_excerpt, FieldExtractor};
use crate::types::{AnnotatedRecord, Relevance, TimeBucket, RECORD_COLUMNS};
use serde::Serialize;

pub const SPOTLIGHT_SIZE: usize = 10;

/// A high-relevance record prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotlightItem {
    pub title: String,
    pub link: String,
    pub category: String,
    pub excerpt: String,
}

/// First `n` high-relevance records, in collection order.
pub fn spotlight(
    extractor: &FieldExtractor,
    records: &[AnnotatedRecord],
    n: usize,
) -> Vec<SpotlightItem> {
    records
        .iter()
        .filter(|record| extractor.derive(record).relevance == Relevance::High)
        .take(n)
        .map(|record| SpotlightItem {
            title: record.original_title.clone(),
            link: record.link.clone(),
            category: record.category.clone(),
            excerpt: summary_excerpt(&record.gpt_summary).to_string(),
        })
        .collect()
}

/// One exported line, columns in `RECORD_COLUMNS` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub id: String,
    pub original_title: String,
    pub link: String,
    pub category: String,
    pub gpt_summary: String,
}

impl ExportRow {
    fn fields(&self) -> [&str; 5] {
        [
            self.id.as_str(),
            self.original_title.as_str(),
            self.link.as_str(),
            self.category.as_str(),
            self.gpt_summary.as_str(),
        ]
    }
}

pub fn export_rows(records: &[AnnotatedRecord]) -> Vec<ExportRow> {
    records
        .iter()
        .map(|record| ExportRow {
            id: record.id.to_string(),
            original_title: record.original_title.clone(),
            link: record.link.clone(),
            category: record.category.clone(),
            gpt_summary: record.gpt_summary.clone(),
        })
        .collect()
}

/// Header plus one CSV line per row (RFC 4180 quoting, CRLF line ends).
pub fn export_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, &RECORD_COLUMNS);
    for row in rows {
        push_csv_line(&mut out, &row.fields());
    }
    out
}

pub fn export_file_name(bucket: TimeBucket) -> String {
    format!("{}_summaries.csv", bucket)
}

fn push_csv_line(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\r', '\n']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::assign_id;
    use crate::types::TimeBucketPolicy;
    use chrono::{TimeZone, Utc};

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(
            TimeBucketPolicy::Published,
            Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        )
    }

    fn record(title: &str, tier: &str) -> AnnotatedRecord {
        let link = format!("https://example.com/{}", title);
        AnnotatedRecord {
            id: assign_id(title, &link),
            original_title: title.to_string(),
            link,
            category: "ai_climate".to_string(),
            gpt_summary: format!(
                "Title: {}\nSummary: About {}.\nRelevance to Arm: {}",
                title, title, tier
            ),
            published_at: None,
        }
    }

    #[test]
    fn spotlight_returns_fewer_when_fewer_exist() {
        let records = vec![
            record("a", "High"),
            record("b", "Low"),
            record("c", "High"),
            record("d", "Medium"),
        ];
        let items = spotlight(&extractor(), &records, SPOTLIGHT_SIZE);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn spotlight_is_bounded_and_keeps_order() {
        let records: Vec<AnnotatedRecord> =
            (0..15).map(|i| record(&format!("t{}", i), "High")).collect();
        let items = spotlight(&extractor(), &records, SPOTLIGHT_SIZE);
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].title, "t0");
        assert_eq!(items[9].title, "t9");
    }

    #[test]
    fn spotlight_empty_is_valid() {
        assert!(spotlight(&extractor(), &[record("x", "Low")], SPOTLIGHT_SIZE).is_empty());
    }

    #[test]
    fn spotlight_excerpt_is_text_after_summary_label() {
        let items = spotlight(&extractor(), &[record("x", "High")], 1);
        assert!(items[0].excerpt.starts_with("About x."));
    }

    #[test]
    fn export_row_count_matches_input() {
        let records: Vec<AnnotatedRecord> =
            (0..7).map(|i| record(&format!("t{}", i), "High")).collect();
        let rows = export_rows(&records);
        assert_eq!(rows.len(), records.len());
        let csv = export_csv(&rows);
        // header + one line per record; multi-line summaries are quoted, so count CRLFs
        assert_eq!(csv.matches("\r\n").count(), records.len() + 1);
        assert!(csv.starts_with("id,original_title,link,category,gpt_summary\r\n"));
    }

    #[test]
    fn csv_quotes_special_fields() {
        let row = ExportRow {
            id: "1".to_string(),
            original_title: "Say \"hi\", world".to_string(),
            link: "https://example.com".to_string(),
            category: "news".to_string(),
            gpt_summary: "plain".to_string(),
        };
        let csv = export_csv(&[row]);
        assert!(csv.ends_with("1,\"Say \"\"hi\"\", world\",https://example.com,news,plain\r\n"));
    }

    #[test]
    fn file_name_uses_bucket_label() {
        let bucket = TimeBucket::Month { year: 2026, month: 10 };
        assert_eq!(export_file_name(bucket), "October 2026_summaries.csv");
    }
}
