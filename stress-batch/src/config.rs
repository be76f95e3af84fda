//! Configuration for the HRV batch job.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure for the batch job.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub firestore: FirestoreConfig,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project owning the Firestore database.
    pub project_id: String,
    /// Service-account key file. Unset means unauthenticated requests,
    /// which is what the emulator expects.
    #[serde(default)]
    pub credentials_path: Option<String>,
    /// REST endpoint; override to point at an emulator.
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// How far back to query for samples, in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u64,
    /// Window span, in minutes.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,
    /// Expected sampling cadence of the wearable. Window size in samples is
    /// `window_minutes * samples_per_minute`.
    #[serde(default = "default_samples_per_minute")]
    pub samples_per_minute: u64,
    /// Re-run interval in seconds. Unset means run once and exit.
    #[serde(default)]
    pub run_interval_secs: Option<u64>,
}

impl JobConfig {
    pub fn samples_per_window(&self) -> usize {
        (self.window_minutes * self.samples_per_minute) as usize
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            window_minutes: default_window_minutes(),
            samples_per_minute: default_samples_per_minute(),
            run_interval_secs: None,
        }
    }
}

/// Paths to the pretrained artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_classifier_path")]
    pub classifier_path: String,
    #[serde(default = "default_scaler_path")]
    pub scaler_path: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classifier_path: default_classifier_path(),
            scaler_path: default_scaler_path(),
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
fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}
fn default_lookback_hours() -> u64 {
    1
}
fn default_window_minutes() -> u64 {
    5
}
fn default_samples_per_minute() -> u64 {
    12
}
fn default_classifier_path() -> String {
    "models/stress_classifier.onnx".to_string()
}
fn default_scaler_path() -> String {
    "models/scaler.json".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (BATCH__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("BATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
