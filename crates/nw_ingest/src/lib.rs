pub mod client;
pub mod mapper;
pub mod scheduler;
pub mod service;

pub use client::{Envelope, HeadlineSource, NewsApiClient, RawArticle, RawSource};
pub use scheduler::IngestionScheduler;
pub use service::IngestionService;
