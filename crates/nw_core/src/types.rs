use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The canonical record flowing through the pipeline. The same shape is
/// used on the bus, at rest and on the read API; field names on the wire
/// are camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub source_id: Option<String>,
    pub source_name: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub fetched_at: NaiveDateTime,
    pub category: String,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, page: u64, size: u64) -> Self {
        // size is validated to be >= 1 before a request reaches the repository
        let total_pages = total_elements.div_ceil(size.max(1));
        Self {
            content,
            total_elements,
            total_pages,
            page,
            size,
        }
    }
}

/// Sortable article fields. Keeping this a closed enum means the dynamic
/// ORDER BY in the sqlite backend never interpolates caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Title,
    Author,
    SourceName,
    PublishedAt,
    FetchedAt,
    Category,
}

impl SortKey {
    /// Parses a wire-format field name, e.g. "publishedAt".
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "sourceName" => Some(Self::SourceName),
            "publishedAt" => Some(Self::PublishedAt),
            "fetchedAt" => Some(Self::FetchedAt),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Author => "author",
            Self::SourceName => "source_name",
            Self::PublishedAt => "published_at",
            Self::FetchedAt => "fetched_at",
            Self::Category => "category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    /// Case-insensitive; anything other than "asc" means descending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A paginated, sorted query. `page` is zero-based, `size >= 1`.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: SortKey,
    pub direction: SortDir,
}

impl PageRequest {
    /// Default sort: publishedAt descending.
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: SortKey::PublishedAt,
            direction: SortDir::Desc,
        }
    }

    pub fn with_sort(mut self, sort: SortKey, direction: SortDir) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    pub fn offset(&self) -> u64 {
        self.page * self.size
    }
}
