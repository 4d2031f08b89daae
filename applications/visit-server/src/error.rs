/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every failure reaches the browser as `{ok: false, error: "internal"}`
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Store(ref msg) => tracing::error!("Store error: {}", msg),
            ServerError::Upstream(ref e) => tracing::error!("Upstream error: {:?}", e),
            ServerError::Config(ref msg) => tracing::error!("Config error: {}", msg),
            ServerError::Internal(ref msg) => tracing::error!("Internal error: {}", msg),
            ServerError::Io(ref e) => tracing::error!("IO error: {:?}", e),
        }

        let body = Json(json!({
            "ok": false,
            "error": "internal",
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
