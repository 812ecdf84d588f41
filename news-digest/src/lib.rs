pub mod types;
pub mod config;
pub mod identity;
pub mod stopwords;
pub mod extract;
pub mod aggregator;
pub mod aggregators;
pub mod digest;
pub mod fetcher;
pub mod parser;
pub mod traits;
pub mod sources;
pub mod feed_reader;
pub mod llm_adapter;
pub mod prompts;
pub mod store;
pub mod pipeline;

pub use types::*;
pub use config::DigestConfig;
pub use identity::assign_id;
pub use extract::FieldExtractor;
pub use aggregator::{ReportFilter, ReportSummary};
pub use aggregators::TimeBucketAggregator;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use feed_reader::FeedReader;
pub use llm_adapter::{LlmAdapter, MockLlmAdapter, OpenAiAdapter};
pub use store::{MemoryStore, RecordStore, SqliteStore};
pub use pipeline::{BatchReport, DigestPipeline};
