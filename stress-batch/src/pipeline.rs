//! The batch scoring pipeline: fetch, window, extract features, score,
//! persist, summarize.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sentio_common::{StressClass, StressPrediction};

use crate::config::JobConfig;
use crate::error::Result;
use crate::hrv::HrvFeatures;
use crate::model::StressScorer;
use crate::store::StressStore;
use crate::window::{self, Window};

pub struct StressPipeline {
    store: Arc<dyn StressStore>,
    scorer: Arc<dyn StressScorer>,
    job: JobConfig,
}

impl StressPipeline {
    pub fn new(
        store: Arc<dyn StressStore>,
        scorer: Arc<dyn StressScorer>,
        job: JobConfig,
    ) -> StressPipeline {
        StressPipeline { store, scorer, job }
    }

    /// One batch run over everything inside the lookback window.
    ///
    /// Any failure aborts the run before the store write; the write itself is
    /// a single atomic commit, so a failed run persists nothing. There is no
    /// dedup guard: overlapping invocations re-score the same windows.
    pub async fn run(&self) -> Result<Vec<StressPrediction>> {
        let cutoff = Utc::now() - Duration::hours(self.job.lookback_hours as i64);

        tracing::info!(
            lookback_hours = self.job.lookback_hours,
            "Fetching heart-rate samples"
        );
        let samples = self.store.samples_since(cutoff).await?;
        if samples.is_empty() {
            tracing::info!("No new heart-rate data to process");
            return Ok(Vec::new());
        }
        tracing::info!(count = samples.len(), "Loaded heart-rate samples");

        let windows = window::partition(samples, self.job.samples_per_window());
        tracing::info!(count = windows.len(), "Formed time windows");

        let now = Utc::now();
        let mut predictions = Vec::new();
        for window in &windows {
            if let Some(prediction) = self.score_window(window, now)? {
                predictions.push(prediction);
            }
        }

        if !predictions.is_empty() {
            self.store.write_predictions(&predictions).await?;
            tracing::info!(count = predictions.len(), "Stored stress predictions");
        }

        log_summary(&predictions);
        Ok(predictions)
    }

    /// Score one window, or skip it when it carries too little interval data.
    fn score_window(
        &self,
        window: &Window,
        now: DateTime<Utc>,
    ) -> Result<Option<StressPrediction>> {
        let intervals = window.flatten_intervals();
        let Some(features) = HrvFeatures::from_intervals(&intervals) else {
            tracing::debug!(
                window_start = %window.start(),
                "Window skipped: not enough interval data"
            );
            return Ok(None);
        };

        let (stress, probabilities) = self.scorer.score(&features)?;

        Ok(Some(StressPrediction {
            stress,
            probabilities,
            sdnn: features.sdnn,
            rmssd: features.rmssd,
            window_start: window.start(),
            window_end: window.end(),
            prediction_timestamp: now,
            num_samples: window.len(),
        }))
    }
}

/// Per-class counts and average probabilities for the run log.
fn log_summary(predictions: &[StressPrediction]) {
    if predictions.is_empty() {
        return;
    }

    let total = predictions.len();
    for class in StressClass::ALL {
        let count = predictions
            .iter()
            .filter(|prediction| prediction.stress == class)
            .count();
        let avg_probability = predictions
            .iter()
            .map(|prediction| prediction.probabilities.for_class(class))
            .sum::<f64>()
            / total as f64;

        tracing::info!(
            class = class.label(),
            count,
            total,
            avg_probability = format!("{avg_probability:.2}"),
            "Run summary"
        );
    }
}
