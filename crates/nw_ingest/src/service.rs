use crate::client::HeadlineSource;
use crate::mapper;
use nw_core::{BusPublisher, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One category's fetch -> normalize -> publish pipeline.
pub struct IngestionService {
    source: Arc<dyn HeadlineSource>,
    publisher: Arc<dyn BusPublisher>,
}

impl IngestionService {
    pub fn new(source: Arc<dyn HeadlineSource>, publisher: Arc<dyn BusPublisher>) -> Self {
        Self { source, publisher }
    }

    /// Fetches top headlines for `category` and publishes each mapped
    /// article keyed by its id. Per-message publish failures are logged and
    /// the rest of the batch continues; the return value counts the sends
    /// that were handed to the bus.
    pub async fn fetch_and_publish(&self, category: &str) -> Result<usize> {
        let envelope = self.source.fetch_top_headlines(Some(category)).await?;
        if envelope.status != "ok" {
            warn!(
                "provider answered status {:?} for category {}, treating as empty",
                envelope.status, category
            );
            return Ok(0);
        }
        info!(
            "Fetched {} articles for category: {}",
            envelope.articles.len(),
            category
        );

        let articles = mapper::map_envelope(&envelope, category);
        debug!("Mapped {} articles for publishing", articles.len());

        let mut published = 0;
        for article in &articles {
            let payload = match serde_json::to_vec(article) {
                Ok(payload) => payload,
                Err(e) => {
                    error!("failed to serialize article {}: {}", article.id, e);
                    continue;
                }
            };
            match self.publisher.send(&article.id, payload).await {
                Ok(()) => {
                    debug!("Publishing article: {} - {}", article.id, article.title);
                    published += 1;
                }
                Err(e) => error!("failed to publish article {}: {}", article.id, e),
            }
        }
        Ok(published)
    }
}
