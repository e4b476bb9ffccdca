use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/search", get(handlers::search_articles))
        .route(
            "/api/articles/published-after",
            get(handlers::articles_published_after),
        )
        .route(
            "/api/articles/category/:category",
            get(handlers::articles_by_category),
        )
        .route("/api/articles/:id", get(handlers::get_article))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::AppState;
    pub use nw_core::{Article, Error, Result};
}
