mod config;
mod errors;
mod layout;
mod reflow;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::MeasurementService;
use crate::reflow::{spawn_driver, Coordinator, Document, ReadyState};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hero-reflow v{}", env!("CARGO_PKG_VERSION"));

    let document = match &config.page_fixture {
        Some(path) => {
            let document = Document::from_fixture(path, config.viewport_width_px)?;
            info!(
                "Loaded {} elements from {}",
                document.element_count(),
                path.display()
            );
            document
        }
        None => Document::new(config.viewport_width_px, ReadyState::Complete),
    };

    let coordinator = Coordinator::new(
        document,
        MeasurementService::with_metric_tables(),
        config.quiet_period,
    );
    let (reflow, _driver) = spawn_driver(coordinator);
    info!(
        "Reflow driver started (quiet period {}ms, viewport {}px)",
        config.quiet_period.as_millis(),
        config.viewport_width_px
    );

    let state = AppState { reflow };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
