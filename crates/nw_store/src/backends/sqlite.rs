use async_trait::async_trait;
use chrono::NaiveDateTime;
use nw_core::{Article, ArticleRepository, Error, Page, PageRequest, Result, SortDir, SortKey};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        content TEXT,
        author TEXT,
        source_id TEXT,
        source_name TEXT,
        url TEXT,
        image_url TEXT,
        published_at TEXT,
        fetched_at TEXT NOT NULL,
        category TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_news_articles_category ON news_articles (category)",
    "CREATE INDEX IF NOT EXISTS idx_news_articles_published_at ON news_articles (published_at)",
    // Add future migrations here
];

/// SQLite-backed repository over the `news_articles` table.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to a `sqlite:` URL, creating the database file and schema
    /// when missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::Database(format!("invalid database url: {}", e)))?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool })
    }

    pub async fn open_file(path: &Path) -> Result<Self> {
        Self::connect(&format!("sqlite://{}", path.display())).await
    }
}

fn row_to_article(row: &SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        author: row.get("author"),
        source_id: row.get("source_id"),
        source_name: row.get("source_name"),
        url: row.get("url"),
        image_url: row.get("image_url"),
        published_at: row.get::<Option<NaiveDateTime>, _>("published_at"),
        fetched_at: row.get::<NaiveDateTime, _>("fetched_at"),
        category: row.get("category"),
    }
}

fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}

#[async_trait]
impl ArticleRepository for SqliteRepository {
    async fn save(&self, article: &Article) -> Result<Article> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO news_articles
            (id, title, description, content, author, source_id, source_name,
             url, image_url, published_at, fetched_at, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(article.description.as_deref())
        .bind(article.content.as_deref())
        .bind(article.author.as_deref())
        .bind(article.source_id.as_deref())
        .bind(article.source_name.as_deref())
        .bind(article.url.as_deref())
        .bind(article.image_url.as_deref())
        .bind(article.published_at)
        .bind(article.fetched_at)
        .bind(&article.category)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to save article: {}", e)))?;

        Ok(article.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM news_articles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("failed to load article: {}", e)))?;

        Ok(row.as_ref().map(row_to_article))
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Article>> {
        // sort column comes from the SortKey whitelist, never from callers
        let sql = format!(
            "SELECT * FROM news_articles ORDER BY {} {} LIMIT ? OFFSET ?",
            request.sort.column(),
            request.direction.keyword()
        );
        let rows = sqlx::query(&sql)
            .bind(request.size as i64)
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("failed to list articles: {}", e)))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("failed to count articles: {}", e)))?;

        Ok(Page::new(
            rows.iter().map(row_to_article).collect(),
            total as u64,
            request.page,
            request.size,
        ))
    }

    async fn find_by_category(
        &self,
        category: &str,
        page: u64,
        size: u64,
    ) -> Result<Page<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM news_articles
            WHERE category = ?
            ORDER BY published_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(category)
        .bind(size as i64)
        .bind(page.saturating_mul(size) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to list category {}: {}", category, e)))?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM news_articles WHERE category = ?")
                .bind(category)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("failed to count category: {}", e)))?;

        Ok(Page::new(
            rows.iter().map(row_to_article).collect(),
            total as u64,
            page,
            size,
        ))
    }

    async fn find_by_published_after(&self, cutoff: NaiveDateTime) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM news_articles
            WHERE published_at > ?
            ORDER BY published_at DESC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to query published-after: {}", e)))?;

        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<Article>> {
        let pattern = like_pattern(query);
        let rows = sqlx::query(
            r#"
            SELECT * FROM news_articles
            WHERE lower(title) LIKE ? ESCAPE '\'
               OR lower(description) LIKE ? ESCAPE '\'
            ORDER BY published_at DESC
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to search articles: {}", e)))?;

        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn find_by_source_name(&self, source_name: &str) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM news_articles
            WHERE source_name = ?
            ORDER BY published_at DESC
            "#,
        )
        .bind(source_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to query source {}: {}", source_name, e)))?;

        Ok(rows.iter().map(row_to_article).collect())
    }

    async fn find_by_category_between(
        &self,
        category: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM news_articles
            WHERE category = ? AND published_at BETWEEN ? AND ?
            ORDER BY published_at DESC
            "#,
        )
        .bind(category)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("failed to query category range: {}", e)))?;

        Ok(rows.iter().map(row_to_article).collect())
    }
}
