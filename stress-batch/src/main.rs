//! HRV batch job: scores recent heart-rate windows with a pretrained
//! classifier and writes stress predictions back to the document store.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stress_batch::config::Config;
use stress_batch::model::StressModel;
use stress_batch::pipeline::StressPipeline;
use stress_batch::store::FirestoreClient;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("stress-batch {}", VERSION);
        return Ok(());
    }
    let run_once = args.iter().any(|a| a == "--once");

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set BATCH__FIRESTORE__PROJECT_ID.",
            e
        )
    })?;
    tracing::info!(project = %config.firestore.project_id, "Starting stress-batch");

    // Wire up the store and the pretrained artifacts
    let store = Arc::new(FirestoreClient::new(&config.firestore)?);
    let model = StressModel::load(&config.models);
    if !model.is_ready() {
        tracing::warn!("Model artifacts missing; runs will fail until they are available");
    }

    let pipeline = StressPipeline::new(store, Arc::new(model), config.job.clone());

    match config.job.run_interval_secs {
        Some(interval_secs) if !run_once => {
            tracing::info!(interval_secs, "Running on a schedule");
            loop {
                if let Err(err) = pipeline.run().await {
                    tracing::error!(error = %err, "Batch run failed");
                }
                tokio::time::sleep(Duration::from_secs(interval_secs)).await;
            }
        }
        _ => {
            let predictions = pipeline.run().await.map_err(|err| {
                tracing::error!(error = %err, "Batch run failed");
                err
            })?;
            tracing::info!(count = predictions.len(), "Batch run complete");
            Ok(())
        }
    }
}
