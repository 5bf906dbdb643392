use axum::{extract::State, http::{header, StatusCode}, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    errors::AppError,
    poster::{self, ElementType, PreparedElement, TemplateElement},
    qr::logo,
    state::AppState,
};

#[derive(Deserialize, Debug)]
pub struct PosterRequest {
    pub template_url: String,
    pub elements: Vec<TemplateElement>,
}

#[instrument(skip_all, fields(template = %req.template_url, elements = req.elements.len()))]
pub async fn make_poster(State(state): State<AppState>, Json(req): Json<PosterRequest>) -> Result<impl IntoResponse, AppError> {
    for (i, el) in req.elements.iter().enumerate() {
        el.validate(i)?;
    }

    let template = state
        .http
        .fetch_bytes(&req.template_url)
        .await
        .map_err(AppError::RemoteFetch)?;
    let doc = tokio::task::spawn_blocking(move || poster::open_template(&template))
        .await
        .map_err(anyhow::Error::from)??;

    let mut prepared = Vec::with_capacity(req.elements.len());
    for element in req.elements {
        let logo = match element.element_type {
            ElementType::Qr => logo::fetch_logo(&state.http, element.qr_styles.logo_url.as_deref()).await?,
            ElementType::Text => None,
        };
        prepared.push(PreparedElement { element, logo });
    }

    let pdf = tokio::task::spawn_blocking(move || poster::assemble(doc, &prepared))
        .await
        .map_err(anyhow::Error::from)??;
    info!(bytes = pdf.len(), "poster ready");
    Ok((StatusCode::CREATED, [(header::CONTENT_TYPE, "application/pdf")], pdf))
}
