//! Sentio Common Types
//!
//! Shared types used by the live analysis backend and the HRV batch job.

pub mod emotion;
pub mod face;
pub mod hrv;
pub mod protocol;

pub use emotion::{EmotionLabel, StressTier};
pub use face::FaceBox;
pub use hrv::{HeartRateSample, StressClass, StressPrediction, StressProbabilities};
pub use protocol::{AnalyzeRequest, AnalyzeResponse, EmotionReading};
