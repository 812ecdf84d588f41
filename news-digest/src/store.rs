use crate::types::{AnnotatedRecord, ArticleId, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Append-only collection of annotated records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a record. Returns `false` if a record with the same id already exists.
    async fn append(&self, record: &AnnotatedRecord) -> Result<bool>;

    async fn contains(&self, id: &ArticleId) -> Result<bool>;

    /// Every record, in the order it was appended.
    async fn load_all(&self) -> Result<Vec<AnnotatedRecord>>;
}

pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    /// Open the database and make sure the records table exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        // each in-memory connection is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS annotated_records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                original_title TEXT NOT NULL,
                link TEXT NOT NULL,
                category TEXT NOT NULL,
                gpt_summary TEXT NOT NULL,
                published TEXT
            )
            "#,
        )
        .execute(&db)
        .await?;

        info!("Record store ready");
        Ok(Self { db })
    }

    fn row_to_record(row: &SqliteRow) -> Result<AnnotatedRecord> {
        Ok(AnnotatedRecord {
            id: ArticleId::from_hex(row.try_get::<String, _>("id")?),
            original_title: row.try_get("original_title")?,
            link: row.try_get("link")?,
            category: row.try_get("category")?,
            gpt_summary: row.try_get("gpt_summary")?,
            published_at: row.try_get("published")?,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn append(&self, record: &AnnotatedRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO annotated_records
                (id, original_title, link, category, gpt_summary, published)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.original_title)
        .bind(&record.link)
        .bind(&record.category)
        .bind(&record.gpt_summary)
        .bind(record.published_at.as_deref())
        .execute(&self.db)
        .await?;

        let inserted = result.rows_affected() > 0;
        debug!("append {} -> inserted={}", record.id, inserted);
        Ok(inserted)
    }

    async fn contains(&self, id: &ArticleId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM annotated_records WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.db)
            .await?;
        Ok(row.is_some())
    }

    async fn load_all(&self) -> Result<Vec<AnnotatedRecord>> {
        let rows = sqlx::query(
            "SELECT id, original_title, link, category, gpt_summary, published \
             FROM annotated_records ORDER BY seq",
        )
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }
}

/// In-process store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AnnotatedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, record: &AnnotatedRecord) -> Result<bool> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn contains(&self, id: &ArticleId) -> Result<bool> {
        Ok(self.records.read().await.iter().any(|record| &record.id == id))
    }

    async fn load_all(&self) -> Result<Vec<AnnotatedRecord>> {
        Ok(self.records.read().await.clone())
    }
}
