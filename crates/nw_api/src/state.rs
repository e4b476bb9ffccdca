use nw_core::ArticleRepository;
use std::sync::Arc;

pub struct AppState {
    pub repository: Arc<dyn ArticleRepository>,
}
