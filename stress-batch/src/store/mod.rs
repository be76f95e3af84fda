//! Document store access for the batch job.

mod firestore;

pub use firestore::FirestoreClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sentio_common::{HeartRateSample, StressPrediction};

use crate::error::Result;

/// Read and write access to the heart-rate document store.
#[async_trait]
pub trait StressStore: Send + Sync {
    /// All heart-rate samples with `timestamp >= cutoff`.
    async fn samples_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<HeartRateSample>>;

    /// Persist predictions as one atomic batch: either every document is
    /// written or none are.
    async fn write_predictions(&self, predictions: &[StressPrediction]) -> Result<()>;
}
