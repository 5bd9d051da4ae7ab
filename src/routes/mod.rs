pub mod handlers;
pub mod templates;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::classifier::ImageClassifier;
use crate::upload::UploadDir;

pub use templates::Templates;

pub struct AppState {
    pub db: SqlitePool,
    pub uploads: UploadDir,
    pub classifier: Arc<dyn ImageClassifier>,
    pub templates: Templates,
    pub max_upload_bytes: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(state.uploads.root());

    Router::new()
        // HTML pages
        .route("/", get(handlers::index).post(handlers::predict))
        .route("/history", get(handlers::history))
        // JSON endpoints
        .route("/api/history", get(handlers::api_history))
        .route("/health", get(handlers::health_check))
        // Stored uploads
        .nest_service("/image", images)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
