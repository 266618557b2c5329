//! GeoCycle Dashboard — Binary Entrypoint
//! Boots the Axum HTTP server: loads the dumpsite dataset once, wires the
//! JSON API, metrics, and static UI, then serves until interrupted.
//!
//! See `README.md` for quickstart.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use geocycle_dashboard::api::{self, AppState};
use geocycle_dashboard::dataset;
use geocycle_dashboard::metrics::Metrics;
use geocycle_dashboard::palette::Palette;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const ENV_BIND_ADDR: &str = "BIND_ADDR";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("geocycle_dashboard=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let path = dataset::dataset_path();
    let dataset = dataset::load(&path)
        .with_context(|| format!("loading dataset from {}", path.display()))?;
    info!(
        records = dataset.records.len(),
        path = %path.display(),
        "dataset loaded"
    );

    let metrics = Metrics::init(dataset.records.len());
    let state = AppState::new(dataset, Palette::load_default());
    let app = api::router(state).merge(metrics.router());

    let addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
