use async_trait::async_trait;
use chrono::NaiveDateTime;
use nw_core::{Article, ArticleRepository, Page, PageRequest, Result, SortDir, SortKey};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// HashMap-backed repository. Default backend for the single-process `run`
/// mode and for tests; rows vanish with the process.
pub struct MemoryRepository {
    articles: RwLock<HashMap<String, Article>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn compare(a: &Article, b: &Article, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Author => a.author.cmp(&b.author),
        SortKey::SourceName => a.source_name.cmp(&b.source_name),
        SortKey::PublishedAt => a.published_at.cmp(&b.published_at),
        SortKey::FetchedAt => a.fetched_at.cmp(&b.fetched_at),
        SortKey::Category => a.category.cmp(&b.category),
    }
}

fn sort(articles: &mut [Article], key: SortKey, direction: SortDir) {
    // None sorts below any value, matching NULL ordering in the sqlite backend
    articles.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match direction {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
}

fn paginate(articles: Vec<Article>, page: u64, size: u64) -> Page<Article> {
    let total = articles.len() as u64;
    let content = articles
        .into_iter()
        .skip((page.saturating_mul(size)) as usize)
        .take(size as usize)
        .collect();
    Page::new(content, total, page, size)
}

#[async_trait]
impl ArticleRepository for MemoryRepository {
    async fn save(&self, article: &Article) -> Result<Article> {
        let mut articles = self.articles.write().await;
        articles.insert(article.id.clone(), article.clone());
        Ok(article.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.get(id).cloned())
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Article>> {
        let articles = self.articles.read().await;
        let mut all: Vec<Article> = articles.values().cloned().collect();
        sort(&mut all, request.sort, request.direction);
        Ok(paginate(all, request.page, request.size))
    }

    async fn find_by_category(
        &self,
        category: &str,
        page: u64,
        size: u64,
    ) -> Result<Page<Article>> {
        let articles = self.articles.read().await;
        let mut matching: Vec<Article> = articles
            .values()
            .filter(|a| a.category == category)
            .cloned()
            .collect();
        sort(&mut matching, SortKey::PublishedAt, SortDir::Desc);
        Ok(paginate(matching, page, size))
    }

    async fn find_by_published_after(&self, cutoff: NaiveDateTime) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut matching: Vec<Article> = articles
            .values()
            .filter(|a| matches!(a.published_at, Some(published) if published > cutoff))
            .cloned()
            .collect();
        sort(&mut matching, SortKey::PublishedAt, SortDir::Desc);
        Ok(matching)
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<Article>> {
        let needle = query.to_lowercase();
        let articles = self.articles.read().await;
        let mut matching: Vec<Article> = articles
            .values()
            .filter(|a| {
                a.title.to_lowercase().contains(&needle)
                    || a.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        sort(&mut matching, SortKey::PublishedAt, SortDir::Desc);
        Ok(matching)
    }

    async fn find_by_source_name(&self, source_name: &str) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut matching: Vec<Article> = articles
            .values()
            .filter(|a| a.source_name.as_deref() == Some(source_name))
            .cloned()
            .collect();
        sort(&mut matching, SortKey::PublishedAt, SortDir::Desc);
        Ok(matching)
    }

    async fn find_by_category_between(
        &self,
        category: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut matching: Vec<Article> = articles
            .values()
            .filter(|a| {
                a.category == category
                    && matches!(a.published_at, Some(p) if p >= start && p <= end)
            })
            .cloned()
            .collect();
        sort(&mut matching, SortKey::PublishedAt, SortDir::Desc);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn article(id: &str, category: &str, published_at: Option<NaiveDateTime>) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {}", id),
            description: Some(format!("Description {}", id)),
            content: None,
            author: None,
            source_id: None,
            source_name: Some("Wire".to_string()),
            url: None,
            image_url: None,
            published_at,
            fetched_at: at(1, 0),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_then_find_by_id_round_trips() {
        let repo = MemoryRepository::new();
        let a = article("a1", "technology", Some(at(2, 10)));
        repo.save(&a).await.unwrap();

        let found = repo.find_by_id("a1").await.unwrap().unwrap();
        assert_eq!(found, a);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_and_replaces() {
        let repo = MemoryRepository::new();
        let a = article("a1", "technology", Some(at(2, 10)));
        repo.save(&a).await.unwrap();
        repo.save(&a).await.unwrap();

        let page = repo.find_all(&PageRequest::new(0, 10)).await.unwrap();
        assert_eq!(page.total_elements, 1);

        let mut updated = a.clone();
        updated.title = "Rewritten".to_string();
        repo.save(&updated).await.unwrap();

        let found = repo.find_by_id("a1").await.unwrap().unwrap();
        assert_eq!(found.title, "Rewritten");
        let page = repo.find_all(&PageRequest::new(0, 10)).await.unwrap();
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn test_pagination_totality() {
        let repo = MemoryRepository::new();
        for i in 0..15 {
            repo.save(&article(
                &format!("a{:02}", i),
                "technology",
                Some(at(1 + i as u32, 0)),
            ))
            .await
            .unwrap();
        }
        repo.save(&article("other", "business", Some(at(1, 0))))
            .await
            .unwrap();

        let first = repo.find_by_category("technology", 0, 10).await.unwrap();
        assert_eq!(first.content.len(), 10);
        assert_eq!(first.total_elements, 15);
        assert_eq!(first.total_pages, 2);

        let second = repo.find_by_category("technology", 1, 10).await.unwrap();
        assert_eq!(second.content.len(), 5);

        // each row appears exactly once across the pages
        let mut seen: Vec<String> = first
            .content
            .iter()
            .chain(second.content.iter())
            .map(|a| a.id.clone())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 15);

        // publishedAt descending within and across pages
        assert_eq!(first.content[0].id, "a14");
        assert_eq!(second.content[4].id, "a00");
    }

    #[tokio::test]
    async fn test_find_all_sorting() {
        let repo = MemoryRepository::new();
        repo.save(&article("a1", "technology", Some(at(3, 0))))
            .await
            .unwrap();
        repo.save(&article("a2", "technology", Some(at(5, 0))))
            .await
            .unwrap();
        repo.save(&article("a3", "technology", None)).await.unwrap();

        let desc = repo.find_all(&PageRequest::new(0, 10)).await.unwrap();
        let ids: Vec<&str> = desc.content.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1", "a3"]);

        let asc = repo
            .find_all(&PageRequest::new(0, 10).with_sort(SortKey::PublishedAt, SortDir::Asc))
            .await
            .unwrap();
        let ids: Vec<&str> = asc.content.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a1", "a2"]);

        let by_title = repo
            .find_all(&PageRequest::new(0, 10).with_sort(SortKey::Title, SortDir::Asc))
            .await
            .unwrap();
        let ids: Vec<&str> = by_title.content.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
    }

    #[tokio::test]
    async fn test_cutoff_is_strict() {
        let repo = MemoryRepository::new();
        repo.save(&article("before", "technology", Some(at(2, 9))))
            .await
            .unwrap();
        repo.save(&article("exact", "technology", Some(at(2, 10))))
            .await
            .unwrap();
        repo.save(&article("after", "technology", Some(at(2, 11))))
            .await
            .unwrap();
        repo.save(&article("undated", "technology", None))
            .await
            .unwrap();

        let found = repo.find_by_published_after(at(2, 10)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "after");
    }

    #[tokio::test]
    async fn test_search_symmetry() {
        let repo = MemoryRepository::new();
        let mut in_title = article("t", "technology", Some(at(2, 0)));
        in_title.title = "Rust Ships Release".to_string();
        in_title.description = Some("nothing relevant".to_string());
        let mut in_description = article("d", "technology", Some(at(3, 0)));
        in_description.title = "Other headline".to_string();
        in_description.description = Some("All about RUST today".to_string());
        let mut neither = article("n", "technology", Some(at(4, 0)));
        neither.title = "Unrelated".to_string();
        neither.description = None;

        repo.save(&in_title).await.unwrap();
        repo.save(&in_description).await.unwrap();
        repo.save(&neither).await.unwrap();

        let mut found: Vec<String> = repo
            .search_by_text("rust")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        found.sort();
        assert_eq!(found, vec!["d", "t"]);
    }

    #[tokio::test]
    async fn test_source_name_lookup() {
        let repo = MemoryRepository::new();
        let mut a = article("a1", "technology", Some(at(2, 0)));
        a.source_name = Some("Reuters".to_string());
        let b = article("a2", "technology", Some(at(3, 0)));
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        let found = repo.find_by_source_name("Reuters").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a1");
    }

    #[tokio::test]
    async fn test_category_range_is_inclusive() {
        let repo = MemoryRepository::new();
        repo.save(&article("a1", "technology", Some(at(2, 0))))
            .await
            .unwrap();
        repo.save(&article("a2", "technology", Some(at(4, 0))))
            .await
            .unwrap();
        repo.save(&article("a3", "technology", Some(at(6, 0))))
            .await
            .unwrap();
        repo.save(&article("a4", "business", Some(at(4, 0))))
            .await
            .unwrap();

        let found = repo
            .find_by_category_between("technology", at(2, 0), at(4, 0))
            .await
            .unwrap();
        let mut ids: Vec<&str> = found.iter().map(|a| a.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a1", "a2"]);
    }
}
