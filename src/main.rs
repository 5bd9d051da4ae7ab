mod classifier;
mod config;
mod db;
mod error;
mod routes;
mod upload;

use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::classifier::{ImageClassifier, TractClassifier, TractSettings};
use crate::upload::UploadDir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_classifier_web=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        "Starting image classifier on port {} with model {}",
        config.port,
        config.model_path.display()
    );

    // Upload directory must exist before the first request
    let uploads = UploadDir::new(&config.upload_dir, config.naming);
    uploads.ensure().await?;
    tracing::info!(
        "Storing uploads in {} (naming: {})",
        config.upload_dir.display(),
        config.naming
    );

    // Initialize database
    // Parse the database URL to extract the file path and ensure parent directory exists
    let db_path = config
        .database_url
        .strip_prefix("sqlite:")
        .unwrap_or(&config.database_url);
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("{}?mode=rwc", config.database_url))
        .await?;

    db::init_db(&db).await?;
    tracing::info!("Database initialized at {}", config.database_url);

    // Load the model once; every request shares it
    let settings = TractSettings {
        model_path: config.model_path.clone(),
        labels_path: config.labels_path.clone(),
        normalization: config.normalization,
        layout: config.layout,
        top_k: config.top_k,
    };
    let model = tokio::task::spawn_blocking(move || TractClassifier::load(&settings)).await??;
    let classifier: Arc<dyn ImageClassifier> = Arc::new(model);

    // Create shared state
    let state = Arc::new(routes::AppState {
        db,
        uploads,
        classifier,
        templates: routes::Templates::new()?,
        max_upload_bytes: config.max_upload_bytes,
    });

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Image classifier listening on 0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
