use nw_core::{Article, ArticleRepository, BusMessage, BusSubscriber};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Storage-stage worker: drains the bus and hands every decoded article to
/// the repository. Decode and persistence failures are logged and the
/// worker moves on, so a poisoned record never wedges the stream.
pub struct ArticleConsumer {
    subscriber: Box<dyn BusSubscriber>,
    repository: Arc<dyn ArticleRepository>,
}

impl ArticleConsumer {
    pub fn new(subscriber: Box<dyn BusSubscriber>, repository: Arc<dyn ArticleRepository>) -> Self {
        Self {
            subscriber,
            repository,
        }
    }

    /// Runs until the bus closes.
    pub async fn run(mut self) {
        info!("article consumer started");
        loop {
            match self.subscriber.next_message().await {
                Ok(Some(message)) => self.handle(message).await,
                Ok(None) => break,
                Err(e) => error!("bus receive failed: {}", e),
            }
        }
        info!("article consumer stopped: bus closed");
    }

    async fn handle(&self, message: BusMessage) {
        let article: Article = match serde_json::from_slice(&message.payload) {
            Ok(article) => article,
            Err(e) => {
                error!("failed to decode article payload: {}", e);
                return;
            }
        };
        info!("Received article from bus: {}", article.title);

        match self.repository.save(&article).await {
            Ok(saved) => debug!("Successfully saved article with ID: {}", saved.id),
            Err(e) => error!("Error saving article {}: {}", article.id, e),
        }
    }
}
