use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::classifier::ClassifierError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MissingField(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Multipart(e) => (e.status(), self.to_string()),
            _ => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": "classifier_app_error",
            }
        }));

        (status, body).into_response()
    }
}
