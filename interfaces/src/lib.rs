pub mod defs;

pub use defs::{AnnotatedRecord, ArticleId, FeedCategory, RawArticle, RECORD_COLUMNS};
