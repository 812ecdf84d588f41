use crate::config::DigestConfig;
use crate::feed_reader::FeedReader;
use crate::identity::assign_id;
use crate::llm_adapter::LlmAdapter;
use crate::prompts::{annotation_prompt, overview_prompt};
use crate::store::RecordStore;
use crate::types::{AnnotatedRecord, ArticleId, DigestError, RawArticle, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome counts of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub fetched: usize,
    pub skipped_existing: usize,
    pub annotated: usize,
    pub failed: usize,
}

/// Fetch, annotate and persist, one article at a time.
pub struct DigestPipeline {
    reader: FeedReader,
    annotator: Arc<dyn LlmAdapter>,
    store: Arc<dyn RecordStore>,
    request_delay: Duration,
    temperature: f32,
    overview_temperature: f32,
}

impl DigestPipeline {
    pub fn new(
        reader: FeedReader,
        annotator: Arc<dyn LlmAdapter>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            reader,
            annotator,
            store,
            request_delay: Duration::from_millis(1000),
            temperature: 0.3,
            overview_temperature: 0.4,
        }
    }

    /// Feed reader plus delay and temperatures from config.
    pub fn from_config(
        config: &DigestConfig,
        annotator: Arc<dyn LlmAdapter>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self> {
        let reader = FeedReader::from_config(config)?;
        Ok(Self::new(reader, annotator, store)
            .with_request_delay(Duration::from_millis(config.pipeline.request_delay_ms))
            .with_temperatures(config.annotator.temperature, config.annotator.overview_temperature))
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_temperatures(mut self, annotation: f32, overview: f32) -> Self {
        self.temperature = annotation;
        self.overview_temperature = overview;
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Run one ingestion batch.
    ///
    /// Articles already in the store, or repeated within the batch, are skipped
    /// before any annotation call. Failed annotations are dropped. Store errors
    /// abort the batch; records appended before the error stay.
    pub async fn run_batch(&self) -> Result<BatchReport> {
        let mut report = BatchReport {
            batch_id: Uuid::new_v4(),
            ..Default::default()
        };
        info!(batch_id = %report.batch_id, "Starting batch with {}", self.annotator.adapter_name());

        let articles = self.reader.read_all().await;
        report.fetched = articles.len();

        let mut seen: HashSet<ArticleId> = HashSet::new();
        let mut calls = 0usize;

        for article in &articles {
            let id = assign_id(&article.title, &article.link);
            if !seen.insert(id.clone()) || self.store.contains(&id).await? {
                debug!("Skipping known article {} ({})", article.title, id);
                report.skipped_existing += 1;
                continue;
            }

            if calls > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            calls += 1;

            match annotate_article(self.annotator.as_ref(), article, id, self.temperature).await {
                Some(record) => {
                    if self.store.append(&record).await? {
                        report.annotated += 1;
                    } else {
                        // another writer stored it after the `contains` check
                        debug!("Record {} already stored, not counted", record.id);
                        report.skipped_existing += 1;
                    }
                }
                None => report.failed += 1,
            }
        }

        info!(
            batch_id = %report.batch_id,
            "Batch done: fetched={} skipped={} annotated={} failed={}",
            report.fetched, report.skipped_existing, report.annotated, report.failed
        );
        Ok(report)
    }

    /// Ask the annotator for a short overview of the first filtered records.
    pub async fn generate_overview(&self, records: &[AnnotatedRecord]) -> Result<String> {
        generate_overview(self.annotator.as_ref(), records, self.overview_temperature).await
    }
}

/// Annotate one article. Failures are logged and give `None`.
pub async fn annotate_article(
    adapter: &dyn LlmAdapter,
    article: &RawArticle,
    id: ArticleId,
    temperature: f32,
) -> Option<AnnotatedRecord> {
    let prompt = annotation_prompt(article);
    match adapter.complete(&prompt, temperature).await {
        Ok(summary) => Some(AnnotatedRecord {
            id,
            original_title: article.title.clone(),
            link: article.link.clone(),
            category: article.category.clone(),
            gpt_summary: summary,
            published_at: Some(article.published_at.clone()).filter(|date| !date.is_empty()),
        }),
        Err(e) => {
            warn!("Annotation failed for '{}': {}", article.title, e);
            None
        }
    }
}

pub async fn generate_overview(
    adapter: &dyn LlmAdapter,
    records: &[AnnotatedRecord],
    temperature: f32,
) -> Result<String> {
    if records.is_empty() {
        return Err(DigestError::Annotation("no annotations to summarize".to_string()));
    }
    adapter.complete(&overview_prompt(records), temperature).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_adapter::MockLlmAdapter;
    use crate::store::MemoryStore;
    use crate::traits::PullFeed;
    use async_trait::async_trait;
    use chrono::Utc;

    struct OneArticle(&'static str);

    #[async_trait]
    impl PullFeed for OneArticle {
        fn source_id(&self) -> String {
            format!("one:{}", self.0)
        }

        fn category(&self) -> &str {
            "energy"
        }

        async fn pull(&self) -> Result<Vec<RawArticle>> {
            Ok(vec![article(self.0, "")])
        }
    }

    /// Store shared with a second writer: `contains` never sees the other
    /// writer's rows, so the duplicate only shows up at `append`.
    struct SharedStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl RecordStore for SharedStore {
        async fn append(&self, record: &AnnotatedRecord) -> Result<bool> {
            self.inner.append(record).await
        }

        async fn contains(&self, _id: &ArticleId) -> Result<bool> {
            Ok(false)
        }

        async fn load_all(&self) -> Result<Vec<AnnotatedRecord>> {
            self.inner.load_all().await
        }
    }

    fn article(title: &str, published: &str) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            link: format!("https://example.com/{}", title),
            category: "energy".to_string(),
            description: String::new(),
            published_at: published.to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn annotation_keeps_raw_text_and_date() {
        let adapter = MockLlmAdapter::new("t".to_string());
        let a = article("grid", "Tue, 06 Oct 2026 10:00:00 GMT");
        let id = assign_id(&a.title, &a.link);
        let record = annotate_article(&adapter, &a, id.clone(), 0.3).await.expect("record");
        assert_eq!(record.id, id);
        assert!(record.gpt_summary.starts_with("Title: grid"));
        assert_eq!(record.published_at.as_deref(), Some("Tue, 06 Oct 2026 10:00:00 GMT"));

        let undated = article("undated", "");
        let record = annotate_article(&adapter, &undated, assign_id("undated", &undated.link), 0.3)
            .await
            .expect("record");
        assert_eq!(record.published_at, None);
    }

    #[tokio::test]
    async fn failed_annotation_gives_none() {
        let adapter = MockLlmAdapter::new("t".to_string()).failing_on("grid");
        let a = article("grid", "");
        assert!(annotate_article(&adapter, &a, assign_id("grid", &a.link), 0.3).await.is_none());
    }

    #[tokio::test]
    async fn concurrently_stored_record_counts_as_skipped() {
        let adapter = MockLlmAdapter::new("t".to_string());
        let store = Arc::new(SharedStore { inner: MemoryStore::new() });
        let grid = article("grid", "");
        let earlier = annotate_article(&adapter, &grid, assign_id(&grid.title, &grid.link), 0.3)
            .await
            .expect("record");
        assert!(store.append(&earlier).await.expect("append"));

        let pipeline = DigestPipeline::new(
            FeedReader::new(vec![Box::new(OneArticle("grid"))]),
            Arc::new(MockLlmAdapter::new("batch".to_string())),
            store.clone(),
        )
        .with_request_delay(Duration::ZERO);

        let report = pipeline.run_batch().await.expect("batch");
        assert_eq!(report.fetched, 1);
        assert_eq!(report.annotated, 0);
        assert_eq!(report.skipped_existing, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(store.load_all().await.expect("load").len(), 1);
    }

    #[tokio::test]
    async fn overview_of_nothing_is_an_error() {
        let adapter = MockLlmAdapter::new("t".to_string());
        assert!(generate_overview(&adapter, &[], 0.4).await.is_err());
        assert_eq!(adapter.calls(), 0);
    }
}
