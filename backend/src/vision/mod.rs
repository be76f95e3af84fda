//! Face detection and emotion classification.
//!
//! The detector and classifier are opaque pretrained artifacts behind the
//! [`FaceDetector`] and [`EmotionClassifier`] traits. [`VisionService`] owns
//! the (possibly absent) handles and runs the detect → crop → classify flow.

mod classifier;
mod detector;

pub use classifier::OnnxEmotionClassifier;
pub use detector::OnnxFaceDetector;

use std::sync::Arc;

use image::DynamicImage;
use sentio_common::{EmotionLabel, FaceBox};

use crate::config::ModelsConfig;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("{0} is not loaded")]
    ModelUnavailable(&'static str),

    #[error("Model load failed: {0}")]
    Load(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Classification failed: {0}")]
    Classification(String),
}

/// A single detected face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDetection {
    pub face_box: FaceBox,
    pub score: f32,
}

/// Face detection over a decoded frame.
///
/// Implementations return at most one detection: the highest-confidence face.
/// Multi-face frames are not aggregated.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &DynamicImage) -> Result<Option<FaceDetection>, VisionError>;
}

/// Emotion classification over a cropped face region.
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, face: &DynamicImage) -> Result<EmotionLabel, VisionError>;
}

/// Outcome of analyzing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameAnalysis {
    /// No face in the frame.
    NoFace,
    /// A face was located but classification failed.
    Degraded { face_box: FaceBox },
    /// A face was located and classified.
    Classified {
        label: EmotionLabel,
        face_box: FaceBox,
    },
}

/// Process-wide model handles, loaded once at startup.
///
/// A failed load leaves the handle empty instead of aborting startup; calls
/// that need the missing handle report its absence.
pub struct VisionService {
    detector: Option<Arc<dyn FaceDetector>>,
    classifier: Option<Arc<dyn EmotionClassifier>>,
}

impl VisionService {
    /// Load both model artifacts, logging and tolerating failures.
    pub fn load(config: &ModelsConfig) -> VisionService {
        let detector = match OnnxFaceDetector::load(&config.detector_path, config.min_face_confidence)
        {
            Ok(detector) => {
                tracing::info!(path = %config.detector_path, "Loaded face detector");
                Some(Arc::new(detector) as Arc<dyn FaceDetector>)
            }
            Err(err) => {
                tracing::warn!(
                    path = %config.detector_path,
                    error = %err,
                    "Face detector not loaded; /analyze will report an internal error"
                );
                None
            }
        };

        let classifier = match OnnxEmotionClassifier::load(&config.classifier_path) {
            Ok(classifier) => {
                tracing::info!(path = %config.classifier_path, "Loaded emotion classifier");
                Some(Arc::new(classifier) as Arc<dyn EmotionClassifier>)
            }
            Err(err) => {
                tracing::warn!(
                    path = %config.classifier_path,
                    error = %err,
                    "Emotion classifier not loaded; /analyze will return degraded results"
                );
                None
            }
        };

        VisionService {
            detector,
            classifier,
        }
    }

    /// Build a service from explicit handles.
    pub fn with_handles(
        detector: Option<Arc<dyn FaceDetector>>,
        classifier: Option<Arc<dyn EmotionClassifier>>,
    ) -> VisionService {
        VisionService {
            detector,
            classifier,
        }
    }

    /// Detect and classify the most prominent face in a frame.
    ///
    /// A missing or failing detector is an error; a missing or failing
    /// classifier degrades the result to [`FrameAnalysis::Degraded`] so the
    /// client still gets the geometry it already paid for.
    pub fn analyze(&self, frame: &DynamicImage) -> Result<FrameAnalysis, VisionError> {
        let detector = self
            .detector
            .as_ref()
            .ok_or(VisionError::ModelUnavailable("face detector"))?;

        let Some(detection) = detector.detect(frame)? else {
            return Ok(FrameAnalysis::NoFace);
        };

        let face_box = detection.face_box;
        match self.classify_region(frame, face_box) {
            Ok(label) => Ok(FrameAnalysis::Classified { label, face_box }),
            Err(err) => {
                tracing::warn!(error = %err, "Classification failed, returning face box only");
                Ok(FrameAnalysis::Degraded { face_box })
            }
        }
    }

    fn classify_region(
        &self,
        frame: &DynamicImage,
        face_box: FaceBox,
    ) -> Result<EmotionLabel, VisionError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(VisionError::ModelUnavailable("emotion classifier"))?;

        if face_box.width == 0 || face_box.height == 0 {
            return Err(VisionError::Classification(
                "face box has zero area".to_string(),
            ));
        }

        let face = frame.crop_imm(face_box.x, face_box.y, face_box.width, face_box.height);
        classifier.classify(&face)
    }
}
