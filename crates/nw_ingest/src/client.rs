use async_trait::async_trait;
use nw_core::config::UpstreamConfig;
use nw_core::{Error, Result};
use serde::Deserialize;
use tracing::info;

/// The JSON envelope returned by the news provider for one request.
/// `status != "ok"` is carried as a value, not an error; callers decide
/// how to treat it.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// One article as the provider reports it. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawArticle {
    pub source: Option<RawSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Seam between the periodic driver and the provider, so the pipeline can
/// run against a mock in tests.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch_top_headlines(&self, category: Option<&str>) -> Result<Envelope>;
}

pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    default_category: String,
}

impl NewsApiClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            default_category: config.default_category.clone(),
        }
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn fetch_top_headlines(&self, category: Option<&str>) -> Result<Envelope> {
        let category = category.unwrap_or(&self.default_category);
        info!("Fetching news articles for category: {}", category);

        let response = self
            .http
            .get(format!("{}/top-headlines", self.base_url))
            .query(&[
                ("category", category),
                ("language", "en"),
                // the provider requires a country parameter
                ("country", "us"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("request to news provider failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "news provider returned {} for category {}",
                status, category
            )));
        }

        response
            .json::<Envelope>()
            .await
            .map_err(|e| Error::Upstream(format!("undecodable provider response: {}", e)))
    }
}
