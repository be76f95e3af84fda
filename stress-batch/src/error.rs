//! Error types for the batch job.

/// Any of these aborts the whole run; the pipeline never commits a partial
/// batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Model not loaded: {0}")]
    ModelNotLoaded(&'static str),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;
