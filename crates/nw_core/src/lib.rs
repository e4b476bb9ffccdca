pub mod bus;
pub mod config;
pub mod error;
pub mod repository;
pub mod types;

pub use bus::{BusMessage, BusPublisher, BusSubscriber};
pub use error::Error;
pub use repository::ArticleRepository;
pub use types::{Article, Page, PageRequest, SortDir, SortKey};

pub type Result<T> = std::result::Result<T, Error>;
