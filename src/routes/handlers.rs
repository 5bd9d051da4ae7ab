use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::Html,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::{self, NewClassification};
use crate::error::AppError;
use crate::routes::AppState;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "imagefile";

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render_index(None, None)?))
}

/// Ingest, classify, persist, then re-render the form with the result.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let (original_name, data) = read_image_field(&mut multipart).await?;

    let stored = state.uploads.save(&original_name, &data).await?;

    let classifier = Arc::clone(&state.classifier);
    let image_path = stored.filepath.clone();
    let top = tokio::task::spawn_blocking(move || classifier.top_prediction(&image_path)).await??;
    let prediction = top.display();

    let record = NewClassification::new(
        stored.filename.clone(),
        stored.filepath.to_string_lossy().into_owned(),
        prediction.clone(),
        Utc::now(),
    );
    let id = db::insert_record(&state.db, &record).await?;

    tracing::info!(
        id,
        original_name = %original_name,
        filename = %stored.filename,
        prediction = %prediction,
        "Classified upload"
    );

    let image_url = format!("/image/{}", stored.filename);
    let page = state
        .templates
        .render_index(Some(&prediction), Some(&image_url))?;
    Ok(Html(page))
}

async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok((original_name, data));
    }
    Err(AppError::MissingField(IMAGE_FIELD))
}

pub async fn history(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let records = db::get_all_records(&state.db).await?;
    Ok(Html(state.templates.render_history(&records)?))
}

pub async fn api_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let limit = params.limit.clamp(1, 1000);
    let records = db::get_recent_records(&state.db, limit).await?;
    let total = db::count_records(&state.db).await?;
    Ok(Json(json!({ "total": total, "records": records })))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "image_classifier_web"
    }))
}
