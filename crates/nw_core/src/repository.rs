use crate::types::{Article, Page, PageRequest};
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Read/write store over articles. Storage is a mapping `id -> Article`;
/// `save` replaces any existing row with the same id.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Upsert by id. Returns the persisted article.
    async fn save(&self, article: &Article) -> Result<Article>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>>;

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Article>>;

    /// Sorted publishedAt descending.
    async fn find_by_category(&self, category: &str, page: u64, size: u64)
        -> Result<Page<Article>>;

    /// Strictly after the cutoff.
    async fn find_by_published_after(&self, cutoff: NaiveDateTime) -> Result<Vec<Article>>;

    /// Articles whose title or description contains `query` as a
    /// case-insensitive substring.
    async fn search_by_text(&self, query: &str) -> Result<Vec<Article>>;

    async fn find_by_source_name(&self, source_name: &str) -> Result<Vec<Article>>;

    /// Category plus inclusive publishedAt range.
    async fn find_by_category_between(
        &self,
        category: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Article>>;
}
