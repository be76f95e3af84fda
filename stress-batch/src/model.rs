//! Pretrained scaler and stress classifier.
//!
//! Both artifacts come out of the training pipeline: a two-feature
//! standardization scaler exported as JSON and a 3-class classifier exported
//! as ONNX. They are loaded once at startup; a failed load leaves the handle
//! empty and every scoring call reports the absence instead of panicking.

use std::sync::Mutex;

use sentio_common::{StressClass, StressProbabilities};
use serde::Deserialize;

use crate::config::ModelsConfig;
use crate::error::{BatchError, Result};
use crate::hrv::HrvFeatures;

/// Scores one feature vector. The seam exists so the pipeline can run
/// against a stub in tests.
pub trait StressScorer: Send + Sync {
    fn score(&self, features: &HrvFeatures) -> Result<(StressClass, StressProbabilities)>;
}

/// Linear feature scaler: `(x - mean) / scale` per feature, with the
/// parameters fitted at training time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureScaler {
    pub mean: [f64; 2],
    pub scale: [f64; 2],
}

impl FeatureScaler {
    pub fn load(path: &str) -> Result<FeatureScaler> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| BatchError::ModelLoad(format!("{path}: {err}")))?;
        serde_json::from_str(&raw).map_err(|err| BatchError::ModelLoad(format!("{path}: {err}")))
    }

    /// Scale an `[sdnn, rmssd]` vector.
    pub fn transform(&self, features: &HrvFeatures) -> [f64; 2] {
        [
            (features.sdnn - self.mean[0]) / self.scale[0],
            (features.rmssd - self.mean[1]) / self.scale[1],
        ]
    }
}

/// Three-class stress classifier backed by an ONNX Runtime session.
///
/// Follows the sklearn export convention: output 0 is the predicted class
/// label, output 1 the per-class probabilities.
pub struct OnnxStressClassifier {
    session: Mutex<ort::session::Session>,
}

impl OnnxStressClassifier {
    pub fn load(path: &str) -> Result<OnnxStressClassifier> {
        let session = ort::session::Session::builder()
            .and_then(|mut builder| builder.commit_from_file(path))
            .map_err(|err| BatchError::ModelLoad(format!("{path}: {err}")))?;

        Ok(OnnxStressClassifier {
            session: Mutex::new(session),
        })
    }

    pub fn predict(&self, scaled: [f64; 2]) -> Result<(StressClass, StressProbabilities)> {
        let input = ndarray::Array2::from_shape_vec((1, 2), vec![scaled[0] as f32, scaled[1] as f32])
            .map_err(|err| BatchError::Inference(err.to_string()))?;
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|err| BatchError::Inference(err.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| BatchError::Inference("classifier session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|err| BatchError::Inference(err.to_string()))?;

        if outputs.len() < 2 {
            return Err(BatchError::Inference(format!(
                "classifier expected label and probability outputs, got {}",
                outputs.len()
            )));
        }

        let labels = outputs[0]
            .try_extract_array::<i64>()
            .map_err(|err| BatchError::Inference(err.to_string()))?;
        let index = labels
            .iter()
            .next()
            .copied()
            .ok_or_else(|| BatchError::Inference("classifier produced no label".to_string()))?;
        let class = StressClass::from_index(index).ok_or_else(|| {
            BatchError::Inference(format!("classifier label {index} out of range"))
        })?;

        let probs = outputs[1]
            .try_extract_array::<f32>()
            .map_err(|err| BatchError::Inference(err.to_string()))?;
        let probs: Vec<f64> = probs.iter().map(|p| *p as f64).collect();

        Ok((class, probabilities_from_slice(&probs)))
    }
}

/// Read per-class probabilities, tolerating models that emit fewer than
/// three entries.
fn probabilities_from_slice(probs: &[f64]) -> StressProbabilities {
    StressProbabilities {
        low: probs.first().copied().unwrap_or(0.0),
        medium: probs.get(1).copied().unwrap_or(0.0),
        high: probs.get(2).copied().unwrap_or(0.0),
    }
}

/// The pair of pretrained artifacts the batch job depends on.
pub struct StressModel {
    scaler: Option<FeatureScaler>,
    classifier: Option<OnnxStressClassifier>,
}

impl StressModel {
    /// Load both artifacts, logging and tolerating failures.
    pub fn load(config: &ModelsConfig) -> StressModel {
        let scaler = match FeatureScaler::load(&config.scaler_path) {
            Ok(scaler) => {
                tracing::info!(path = %config.scaler_path, "Loaded feature scaler");
                Some(scaler)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Feature scaler not loaded");
                None
            }
        };

        let classifier = match OnnxStressClassifier::load(&config.classifier_path) {
            Ok(classifier) => {
                tracing::info!(path = %config.classifier_path, "Loaded stress classifier");
                Some(classifier)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Stress classifier not loaded");
                None
            }
        };

        StressModel { scaler, classifier }
    }

    pub fn with_parts(
        scaler: Option<FeatureScaler>,
        classifier: Option<OnnxStressClassifier>,
    ) -> StressModel {
        StressModel { scaler, classifier }
    }

    pub fn is_ready(&self) -> bool {
        self.scaler.is_some() && self.classifier.is_some()
    }
}

impl StressScorer for StressModel {
    fn score(&self, features: &HrvFeatures) -> Result<(StressClass, StressProbabilities)> {
        let scaler = self
            .scaler
            .as_ref()
            .ok_or(BatchError::ModelNotLoaded("feature scaler"))?;
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(BatchError::ModelNotLoaded("stress classifier"))?;

        classifier.predict(scaler.transform(features))
    }
}
