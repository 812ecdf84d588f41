use crate::extract::FieldExtractor;
use crate::types::{AnnotatedRecord, TimeBucket};
use tracing::debug;

/// Groups records into reporting months.
pub struct TimeBucketAggregator {
    extractor: FieldExtractor,
}

impl TimeBucketAggregator {
    pub fn new(extractor: FieldExtractor) -> Self {
        Self { extractor }
    }

    /// Distinct buckets, newest month first, `Unknown` last.
    pub fn available_buckets(&self, records: &[AnnotatedRecord]) -> Vec<TimeBucket> {
        let mut buckets: Vec<TimeBucket> = records
            .iter()
            .map(|record| self.extractor.time_bucket(record))
            .collect();
        buckets.sort_by(|a, b| match (a, b) {
            (TimeBucket::Unknown, TimeBucket::Unknown) => std::cmp::Ordering::Equal,
            (TimeBucket::Unknown, _) => std::cmp::Ordering::Greater,
            (_, TimeBucket::Unknown) => std::cmp::Ordering::Less,
            _ => b.cmp(a),
        });
        buckets.dedup();
        buckets
    }

    /// The most recent bucket, which is what a report shows by default.
    pub fn latest_bucket(&self, records: &[AnnotatedRecord]) -> Option<TimeBucket> {
        self.available_buckets(records).into_iter().next()
    }

    /// Records falling in `bucket`, in their original order.
    pub fn in_bucket(
        &self,
        records: &[AnnotatedRecord],
        bucket: TimeBucket,
    ) -> Vec<AnnotatedRecord> {
        let kept: Vec<AnnotatedRecord> = records
            .iter()
            .filter(|record| self.extractor.time_bucket(record) == bucket)
            .cloned()
            .collect();
        debug!("Time bucket {} holds {} of {} records", bucket, kept.len(), records.len());
        kept
    }
}
