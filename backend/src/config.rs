//! Configuration for the live analysis server.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure for the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Paths to the pretrained model artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_detector_path")]
    pub detector_path: String,
    #[serde(default = "default_classifier_path")]
    pub classifier_path: String,
    /// Minimum detection confidence for a face to count.
    #[serde(default = "default_min_face_confidence")]
    pub min_face_confidence: f32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            detector_path: default_detector_path(),
            classifier_path: default_classifier_path(),
            min_face_confidence: default_min_face_confidence(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Minimum interval between processed frames, in milliseconds.
    #[serde(default = "default_throttle_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_throttle_interval_ms(),
        }
    }
}

/// Directory the browser UI is served from.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_ui_dir")]
    pub dir: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dir: default_ui_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_detector_path() -> String {
    "models/face_detector.onnx".to_string()
}
fn default_classifier_path() -> String {
    "models/emotion_classifier.onnx".to_string()
}
fn default_min_face_confidence() -> f32 {
    0.5
}
fn default_throttle_interval_ms() -> u64 {
    200
}
fn default_ui_dir() -> String {
    "ui".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (SENTIO__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("SENTIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
