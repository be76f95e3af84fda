pub mod auth;
pub mod config;
pub mod error;
pub mod hrv;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod window;

pub use config::{Config, FirestoreConfig, JobConfig, ModelsConfig};
pub use error::BatchError;
pub use model::{FeatureScaler, StressModel, StressScorer};
pub use pipeline::StressPipeline;
pub use store::{FirestoreClient, StressStore};
