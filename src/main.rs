use std::net::SocketAddr;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qrposter::{app, config::Config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    let port = config.port;
    let state = AppState::new(config)?;

    let (metrics_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let app = app(state)
        .route("/metrics", get(move || {
            let h = metrics_handle.clone();
            async move { h.render() }
        }))
        .layer(metrics_layer);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
