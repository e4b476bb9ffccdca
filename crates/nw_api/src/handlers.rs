use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDateTime;
use nw_core::{Article, Error, Page, PageRequest, SortDir, SortKey};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

/// Query-surface failures. Bad parameters and misses map to 400/404;
/// everything else is a 500 with the detail kept in the logs.
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(e) => {
                error!("request failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Internal(e)
    }
}

fn default_size() -> u64 {
    10
}

fn default_sort_by() -> String {
    "publishedAt".to_string()
}

fn default_sort_dir() -> String {
    "desc".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
    #[serde(default = "default_sort_by")]
    sort_by: String,
    #[serde(default = "default_sort_dir")]
    sort_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    page: u64,
    #[serde(default = "default_size")]
    size: u64,
}

#[derive(Debug, Deserialize)]
pub struct DateParam {
    date: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: String,
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    info!("Request to get article with id: {}", id);
    state
        .repository
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<Article>>, ApiError> {
    info!(
        "Request to get all articles - page: {}, size: {}",
        params.page, params.size
    );
    if params.size == 0 {
        return Err(ApiError::BadRequest("size must be at least 1".to_string()));
    }
    let sort = SortKey::parse(&params.sort_by).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown sort field: {}", params.sort_by))
    })?;
    let request = PageRequest::new(params.page, params.size)
        .with_sort(sort, SortDir::parse(&params.sort_dir));

    let page = state.repository.find_all(&request).await?;
    Ok(Json(page))
}

pub async fn articles_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Article>>, ApiError> {
    info!("Request to get articles by category: {}", category);
    if params.size == 0 {
        return Err(ApiError::BadRequest("size must be at least 1".to_string()));
    }
    let page = state
        .repository
        .find_by_category(&category, params.page, params.size)
        .await?;
    Ok(Json(page))
}

pub async fn articles_published_after(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateParam>,
) -> Result<Json<Vec<Article>>, ApiError> {
    info!("Request to get articles published after: {}", params.date);
    let cutoff = params.date.parse::<NaiveDateTime>().map_err(|_| {
        ApiError::BadRequest(format!(
            "date must be an ISO-8601 local date-time, got {:?}",
            params.date
        ))
    })?;
    let articles = state.repository.find_by_published_after(cutoff).await?;
    Ok(Json(articles))
}

pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Article>>, ApiError> {
    info!("Request to search articles with query: {}", params.query);
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest(
            "query must not be empty".to_string(),
        ));
    }
    let articles = state.repository.search_by_text(query).await?;
    Ok(Json(articles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_app;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use nw_core::ArticleRepository;
    use nw_store::MemoryRepository;
    use tower::ServiceExt;

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
            source_id: Some("s".to_string()),
            source_name: Some("S".to_string()),
            url: None,
            image_url: None,
            published_at,
            fetched_at: at(1, 0),
            category: category.to_string(),
        }
    }

    async fn app_with(articles: Vec<Article>) -> axum::Router {
        let repository = Arc::new(MemoryRepository::new());
        for article in &articles {
            repository.save(article).await.unwrap();
        }
        create_app(AppState { repository }).await
    }

    async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // rejections from the Query extractor carry plain-text bodies
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_get_article_by_id() {
        let app = app_with(vec![article("a1", "technology", Some(at(2, 10)))]).await;

        let (status, body) = get(&app, "/api/articles/a1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "a1");
        assert_eq!(body["sourceName"], "S");
        assert_eq!(body["publishedAt"], "2024-01-02T10:00:00");

        let (status, _) = get(&app, "/api/articles/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_articles_defaults_and_sorting() {
        let app = app_with(vec![
            article("a1", "technology", Some(at(2, 0))),
            article("a2", "technology", Some(at(5, 0))),
            article("a3", "business", Some(at(3, 0))),
        ])
        .await;

        let (status, body) = get(&app, "/api/articles").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalElements"], 3);
        assert_eq!(body["page"], 0);
        assert_eq!(body["size"], 10);
        assert_eq!(body["content"][0]["id"], "a2");

        let (status, body) = get(&app, "/api/articles?sortBy=publishedAt&sortDir=ASC").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"][0]["id"], "a1");
    }

    #[tokio::test]
    async fn test_list_articles_rejects_bad_params() {
        let app = app_with(vec![]).await;

        let (status, _) = get(&app, "/api/articles?page=banana").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/articles?sortBy=nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/articles?size=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_category_pagination() {
        let mut rows = Vec::new();
        for i in 0..15 {
            rows.push(article(
                &format!("a{:02}", i),
                "technology",
                Some(at(1 + i as u32, 0)),
            ));
        }
        rows.push(article("other", "business", Some(at(1, 0))));
        let app = app_with(rows).await;

        let (status, body) = get(&app, "/api/articles/category/technology?page=0&size=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"].as_array().unwrap().len(), 10);
        assert_eq!(body["totalElements"], 15);
        assert_eq!(body["totalPages"], 2);

        let (status, body) = get(&app, "/api/articles/category/technology?page=1&size=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_published_after() {
        let app = app_with(vec![
            article("old", "technology", Some(at(2, 9))),
            article("new", "technology", Some(at(2, 11))),
        ])
        .await;

        let (status, body) = get(&app, "/api/articles/published-after?date=2024-01-02T10:00:00").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["new"]);

        let (status, _) = get(&app, "/api/articles/published-after?date=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/articles/published-after").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search() {
        let mut hit = article("hit", "technology", Some(at(2, 0)));
        hit.title = "Rust ships a release".to_string();
        let miss = article("miss", "technology", Some(at(3, 0)));
        let app = app_with(vec![hit, miss]).await;

        let (status, body) = get(&app, "/api/articles/search?query=RUST").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["hit"]);
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let app = app_with(vec![]).await;

        let (status, _) = get(&app, "/api/articles/search?query=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/articles/search?query=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&app, "/api/articles/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
