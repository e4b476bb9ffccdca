use crate::service::IngestionService;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Periodic driver for the ingestion stage. Every `interval`, each
/// configured category runs its fetch -> normalize -> publish pipeline;
/// the categories of one cycle run concurrently and each carries its own
/// error boundary, so a failing category never blocks the others. Cycles
/// themselves are serialized: a slow cycle delays the next tick rather
/// than overlapping it.
pub struct IngestionScheduler {
    service: Arc<IngestionService>,
    categories: Vec<String>,
    interval: Duration,
}

impl IngestionScheduler {
    pub fn new(service: Arc<IngestionService>, categories: Vec<String>, interval: Duration) -> Self {
        info!("Configured news categories for ingestion: {:?}", categories);
        Self {
            service,
            categories,
            interval,
        }
    }

    /// Runs forever; the first cycle starts immediately. Dropping the
    /// future (e.g. on shutdown) stops the driver before its next tick.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One ingestion cycle over all configured categories.
    pub async fn run_cycle(&self) {
        info!("Starting scheduled news ingestion");
        let runs = self.categories.iter().map(|category| {
            let service = self.service.clone();
            async move {
                match service.fetch_and_publish(category).await {
                    Ok(count) => {
                        info!("Completed ingestion for category {}: {} articles", category, count)
                    }
                    Err(e) => error!("Error ingesting category {}: {}", category, e),
                }
            }
        });
        join_all(runs).await;
        info!("Completed news ingestion cycle");
    }
}
