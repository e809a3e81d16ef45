//! Geodesic distance RPC server.
//!
//! Run the server with
//! ```not_rust
//! PORT=50051 cargo run
//! ```
//!
//! and call it with
//! ```not_rust
//! curl -s localhost:50051/geodesic_distance -H 'content-type: application/json' \
//!   -d '{"source":{"latitude":-33.047255,"longitude":-71.606330},
//!        "destination":{"latitude":-33.047317,"longitude":-71.614301},"unit":"km"}'
//! ```

mod config;
mod handlers;
mod models;

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::{CONFIG, DEFAULT_LOG_FILTER};
use crate::handlers::handler::router;
use crate::handlers::processor::GeodesicDistanceProcessor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = CONFIG.socket_addr()?;
    let app = router(Arc::new(GeodesicDistanceProcessor::new()), CONFIG.max_concurrent_calls);

    info!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal: {}", e);
        // keep serving
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
