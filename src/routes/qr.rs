use axum::{extract::State, http::{header, StatusCode}, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::instrument;

use crate::{errors::AppError, qr::{self, StyleConfig}, state::AppState};

#[derive(Deserialize, Debug)]
pub struct QrRequest {
    pub url: String,
    #[serde(default)]
    pub qr_styles: StyleConfig,
}

#[instrument(skip_all, fields(len = req.url.len(), format = ?req.qr_styles.output_format))]
pub async fn make_qr(State(state): State<AppState>, Json(req): Json<QrRequest>) -> Result<impl IntoResponse, AppError> {
    let image = qr::build_image_remote(&state.http, req.url, req.qr_styles).await?;
    Ok((StatusCode::CREATED, [(header::CONTENT_TYPE, image.format.mime())], image.bytes))
}
