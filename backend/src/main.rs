//! Sentio live analysis server: receives webcam frames over HTTP, runs face
//! detection plus emotion classification, and returns an emotion label with a
//! derived stress tier.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentio_backend::config::Config;
use sentio_backend::throttle::AdmissionController;
use sentio_backend::vision::VisionService;
use sentio_backend::{logging, routes, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sentio analysis server");

    // Load the pretrained artifacts. Failures are logged and tolerated; the
    // server still answers requests and reports the missing handle.
    let vision = VisionService::load(&config.models);
    let throttle = AdmissionController::new(Duration::from_millis(config.throttle.interval_ms));

    let state = Arc::new(AppState {
        config: config.clone(),
        throttle,
        vision,
    });

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::analyze::router(state.clone()))
        .merge(routes::pages::router(&config.ui.dir))
        .layer(axum::middleware::from_fn(logging::request_logger))
        .layer(cors);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
