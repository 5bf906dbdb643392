//! HTTP service that renders styled QR codes and lays them, with text, over PDF poster templates.

pub mod config;
pub mod errors;
pub mod fetch;
pub mod poster;
pub mod qr;
pub mod routes;
pub mod state;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Router,
};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::routes::{health, poster::make_poster, qr::make_qr};
use crate::state::AppState;

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".into())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("middleware error: {err}"))
    }
}

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/health", get(health))
        .route("/qr/", post(make_qr))
        .route("/poster/", post(make_poster))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit))
                .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TimeoutLayer::new(timeout)),
        )
}
