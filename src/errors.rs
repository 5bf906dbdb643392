use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use tracing::{error, warn};

use crate::{fetch::FetchError, qr::ComposeError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("invalid poster url")] RemoteFetch(#[source] FetchError),
    #[error("invalid poster file")] InvalidDocument(String),
    #[error("{0}")] Validation(String),
    #[error(transparent)] Compose(#[from] ComposeError),
    #[error(transparent)] Anyhow(#[from] anyhow::Error),
}

/// Status used for rejected poster templates.
fn template_rejected() -> StatusCode {
    StatusCode::from_u16(419).unwrap_or(StatusCode::BAD_REQUEST)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::RemoteFetch(err) => {
                warn!(%err, "template fetch failed");
                template_rejected()
            }
            AppError::InvalidDocument(reason) => {
                warn!(%reason, "template is not a usable pdf");
                template_rejected()
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Compose(ComposeError::Encoding(_)) => StatusCode::BAD_REQUEST,
            AppError::Compose(ComposeError::LogoDecode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => {
                error!(err = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (code, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
