use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("extraction error: {0}")]
    Extract(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("acquisition failed for {steam_id}: {source}")]
    Acquisition {
        steam_id: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
