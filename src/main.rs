use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marketplace_orders::clock::SystemClock;
use marketplace_orders::config::Settings;
use marketplace_orders::store::Fixtures;
use marketplace_orders::{api, metrics, InMemoryBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    // Structured logging; RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_new(&settings.log_filter)
                .unwrap_or_else(|_| EnvFilter::new(marketplace_orders::config::DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting marketplace order service");

    // === 1. Stores ===
    let backend = InMemoryBackend::new();
    match &settings.fixture_path {
        Some(path) => {
            Fixtures::load(path)?
                .seed(backend.profiles.as_ref(), backend.catalog.as_ref())
                .await?;
        }
        None => tracing::warn!("FIXTURE_PATH not set, starting with an empty catalog"),
    }

    // === 2. Order engine and metrics ===
    let state = backend.app_state(Arc::new(SystemClock))?;
    tracing::info!(
        metric_families = state.metrics.registry().gather().len(),
        "Metrics registry created"
    );

    // === 3. HTTP server ===
    let (host, port) = settings.bind_address();
    tracing::info!(%host, port, "Listening on http://{}:{}", host, port);

    let app_state = web::Data::new(state.clone());
    let app_metrics = web::Data::from(state.metrics.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .app_data(app_metrics.clone())
            .configure(api::configure)
            .configure(metrics::configure)
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Failed to bind {host}:{port}"))?
    .run()
    .await
    .context("HTTP server stopped with an error")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
