mod common;

use news_digest::aggregator::{summarize, ReportFilter};
use news_digest::digest::{export_csv, export_rows, spotlight, SPOTLIGHT_SIZE};
use news_digest::{
    DigestConfig, DigestPipeline, FieldExtractor, MemoryStore, MockLlmAdapter, RecordStore,
    Relevance, TimeBucket, TimeBucketAggregator, TimeBucketPolicy,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OCT: &str = "Tue, 06 Oct 2026 10:00:00 GMT";
const SEP: &str = "Mon, 14 Sep 2026 08:30:00 GMT";

async fn feed_server() -> MockServer {
    let server = MockServer::start().await;

    let feed_a = common::rss(&[
        ("Grid Upgrade", "https://news.example/grid", OCT),
        ("Scope 3 Rules", "https://news.example/scope3", SEP),
        ("Broken Story", "https://news.example/broken", OCT),
    ]);
    let feed_b = common::rss(&[
        ("Grid Upgrade", "https://news.example/grid", OCT),
        ("Datacenter Power", "https://news.example/dc", OCT),
    ]);

    Mock::given(method("GET"))
        .and(path("/a.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_a))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed_b))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

fn config_for(server: &MockServer) -> DigestConfig {
    let toml_str = format!(
        r#"
[[feeds]]
category = "regulations"
urls = ["{base}/a.xml", "{base}/gone.xml"]

[[feeds]]
category = "ai_climate"
urls = ["{base}/b.xml"]

[fetch]
max_retries = 0

[pipeline]
request_delay_ms = 0
"#,
        base = server.uri()
    );
    DigestConfig::from_toml_str(&toml_str).expect("config")
}

#[tokio::test]
async fn batch_dedups_isolates_failures_and_is_rerunnable() {
    common::init_tracing();
    let server = feed_server().await;
    let config = config_for(&server);

    let annotator = Arc::new(MockLlmAdapter::new("batch".to_string()).failing_on("Broken Story"));
    let store = Arc::new(MemoryStore::new());
    let pipeline =
        DigestPipeline::from_config(&config, annotator.clone(), store.clone()).expect("pipeline");

    let first = pipeline.run_batch().await.expect("batch");
    assert_eq!(first.fetched, 5);
    assert_eq!(first.skipped_existing, 1);
    assert_eq!(first.annotated, 3);
    assert_eq!(first.failed, 1);
    assert_eq!(annotator.calls(), 4);

    let titles: Vec<String> = store
        .load_all()
        .await
        .expect("load")
        .into_iter()
        .map(|r| r.original_title)
        .collect();
    assert_eq!(titles, vec!["Grid Upgrade", "Scope 3 Rules", "Datacenter Power"]);

    let second = pipeline.run_batch().await.expect("batch");
    assert_eq!(second.annotated, 0);
    // the failed article is retried, everything stored is skipped
    assert_eq!(second.skipped_existing, 4);
    assert_eq!(second.failed, 1);
    assert_eq!(annotator.calls(), 5);
    assert_eq!(store.load_all().await.expect("load").len(), 3);
}

#[tokio::test]
async fn stored_records_feed_the_monthly_report() {
    common::init_tracing();
    let server = feed_server().await;
    let config = config_for(&server);

    let annotator = Arc::new(MockLlmAdapter::new("report".to_string()).failing_on("Broken Story"));
    let store = Arc::new(MemoryStore::new());
    DigestPipeline::from_config(&config, annotator, store.clone())
        .expect("pipeline")
        .run_batch()
        .await
        .expect("batch");

    let records = store.load_all().await.expect("load");
    let extractor = FieldExtractor::new(TimeBucketPolicy::Published, common::report_clock());
    let aggregator = TimeBucketAggregator::new(extractor);

    let buckets = aggregator.available_buckets(&records);
    assert_eq!(
        buckets,
        vec![
            TimeBucket::Month { year: 2026, month: 10 },
            TimeBucket::Month { year: 2026, month: 9 },
        ]
    );

    let october = aggregator.in_bucket(&records, buckets[0]);
    let filtered = ReportFilter::for_records(&october).apply(&extractor, &october);
    assert_eq!(filtered.len(), 2);

    let summary = summarize(&extractor, &filtered);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.high_relevance_count, 2);
    assert_eq!(summary.top_mentions[0].token, "Arm");
    assert_eq!(summary.top_mentions[0].count, 2);

    let items = spotlight(&extractor, &filtered, SPOTLIGHT_SIZE);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Grid Upgrade");

    let only_low = ReportFilter::new(["regulations", "ai_climate"], [Relevance::Low])
        .apply(&extractor, &october);
    assert!(only_low.is_empty());

    let csv = export_csv(&export_rows(&filtered));
    assert_eq!(csv.matches("\r\n").count(), 3);
}
