pub mod backends;
pub mod consumer;

pub use backends::*;
pub use consumer::ArticleConsumer;
