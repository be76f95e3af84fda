//! Shared helpers and stub models for tests.

use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use sentio_common::{EmotionLabel, FaceBox};

use crate::config::{Config, LoggingConfig, ModelsConfig, ServerConfig, ThrottleConfig, UiConfig};
use crate::throttle::AdmissionController;
use crate::vision::{
    EmotionClassifier, FaceDetection, FaceDetector, VisionError, VisionService,
};
use crate::AppState;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        models: ModelsConfig::default(),
        throttle: ThrottleConfig {
            // Long enough that a test never crosses the interval by accident.
            interval_ms: 60_000,
        },
        ui: UiConfig {
            dir: "/tmp/sentio-test-ui".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// State with no model handles loaded.
pub fn create_test_state() -> Arc<AppState> {
    create_test_state_with(VisionService::with_handles(None, None))
}

/// State with the given vision service and the test throttle interval.
pub fn create_test_state_with(vision: VisionService) -> Arc<AppState> {
    let config = test_config();
    let throttle = AdmissionController::new(Duration::from_millis(config.throttle.interval_ms));
    Arc::new(AppState {
        config,
        throttle,
        vision,
    })
}

/// Detector that always returns the same detection (or none).
pub struct StubDetector {
    detection: Option<FaceDetection>,
}

impl StubDetector {
    pub fn face(face_box: FaceBox) -> StubDetector {
        StubDetector {
            detection: Some(FaceDetection {
                face_box,
                score: 0.9,
            }),
        }
    }

    pub fn empty() -> StubDetector {
        StubDetector { detection: None }
    }
}

impl FaceDetector for StubDetector {
    fn detect(&self, _frame: &DynamicImage) -> Result<Option<FaceDetection>, VisionError> {
        Ok(self.detection)
    }
}

/// Detector that fails the way a broken session would.
pub struct FailingDetector;

impl FaceDetector for FailingDetector {
    fn detect(&self, _frame: &DynamicImage) -> Result<Option<FaceDetection>, VisionError> {
        Err(VisionError::Detection("stub detector failure".to_string()))
    }
}

/// Classifier that always returns the same label.
pub struct StubClassifier {
    label: EmotionLabel,
}

impl StubClassifier {
    pub fn new(label: EmotionLabel) -> StubClassifier {
        StubClassifier { label }
    }
}

impl EmotionClassifier for StubClassifier {
    fn classify(&self, _face: &DynamicImage) -> Result<EmotionLabel, VisionError> {
        Ok(self.label)
    }
}

/// Classifier that fails the way a broken session would.
pub struct FailingClassifier;

impl EmotionClassifier for FailingClassifier {
    fn classify(&self, _face: &DynamicImage) -> Result<EmotionLabel, VisionError> {
        Err(VisionError::Classification(
            "stub classifier failure".to_string(),
        ))
    }
}
