//! Pipeline tests against an in-memory store and stub scorers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use sentio_common::{HeartRateSample, StressClass, StressPrediction, StressProbabilities};
use stress_batch::error::{BatchError, Result};
use stress_batch::hrv::HrvFeatures;
use stress_batch::model::{StressModel, StressScorer};
use stress_batch::pipeline::StressPipeline;
use stress_batch::store::StressStore;
use stress_batch::JobConfig;

/// Store stub: hands back a fixed sample set and records every commit.
struct InMemoryStore {
    samples: Vec<HeartRateSample>,
    commits: Mutex<Vec<Vec<StressPrediction>>>,
}

impl InMemoryStore {
    fn with_samples(samples: Vec<HeartRateSample>) -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore {
            samples,
            commits: Mutex::new(Vec::new()),
        })
    }

    fn commits(&self) -> Vec<Vec<StressPrediction>> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl StressStore for InMemoryStore {
    async fn samples_since(&self, _cutoff: DateTime<Utc>) -> Result<Vec<HeartRateSample>> {
        Ok(self.samples.clone())
    }

    async fn write_predictions(&self, predictions: &[StressPrediction]) -> Result<()> {
        self.commits.lock().unwrap().push(predictions.to_vec());
        Ok(())
    }
}

/// Scorer stub with a fixed verdict.
struct StubScorer;

impl StressScorer for StubScorer {
    fn score(&self, _features: &HrvFeatures) -> Result<(StressClass, StressProbabilities)> {
        Ok((
            StressClass::Medium,
            StressProbabilities {
                low: 0.1,
                medium: 0.7,
                high: 0.2,
            },
        ))
    }
}

struct FailingScorer;

impl StressScorer for FailingScorer {
    fn score(&self, _features: &HrvFeatures) -> Result<(StressClass, StressProbabilities)> {
        Err(BatchError::Inference("stub scorer failure".to_string()))
    }
}

fn sample(id: &str, second: u32, ibi: &[f64]) -> HeartRateSample {
    HeartRateSample {
        doc_id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, second).unwrap(),
        ibi: ibi.to_vec(),
    }
}

fn job_config(samples_per_window: u64) -> JobConfig {
    JobConfig {
        lookback_hours: 1,
        window_minutes: 1,
        samples_per_minute: samples_per_window,
        run_interval_secs: None,
    }
}

#[tokio::test]
async fn test_empty_store_is_a_noop() {
    let store = InMemoryStore::with_samples(Vec::new());
    let pipeline = StressPipeline::new(store.clone(), Arc::new(StubScorer), job_config(3));

    let predictions = pipeline.run().await.unwrap();
    assert!(predictions.is_empty());
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_windows_are_scored_and_written_in_one_commit() {
    let samples: Vec<_> = (0..6)
        .map(|i| sample(&format!("d{i}"), i * 10, &[800.0, 820.0]))
        .collect();
    let store = InMemoryStore::with_samples(samples);
    let pipeline = StressPipeline::new(store.clone(), Arc::new(StubScorer), job_config(3));

    let predictions = pipeline.run().await.unwrap();
    assert_eq!(predictions.len(), 2);

    // One atomic commit carrying both predictions.
    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0], predictions);

    // Intervals per window: [800, 820, 800, 820, 800, 820]
    //   mean 810, deviations all ±10 -> population std 10
    //   diffs [20, -20, 20, -20, 20] -> rmssd 20
    let first = &predictions[0];
    assert!((first.sdnn - 10.0).abs() < 1e-9);
    assert!((first.rmssd - 20.0).abs() < 1e-9);
    assert_eq!(first.stress, StressClass::Medium);
    assert_eq!(first.num_samples, 3);
    assert_eq!(
        first.window_start,
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    );
    assert_eq!(
        first.window_end,
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 20).unwrap()
    );
    assert_eq!(
        predictions[1].window_start,
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 30).unwrap()
    );
}

#[tokio::test]
async fn test_window_with_too_few_intervals_is_skipped() {
    // Three samples survive windowing, but only one interval value total.
    let samples = vec![
        sample("a", 0, &[800.0]),
        sample("b", 10, &[]),
        sample("c", 20, &[]),
    ];
    let store = InMemoryStore::with_samples(samples);
    let pipeline = StressPipeline::new(store.clone(), Arc::new(StubScorer), job_config(3));

    let predictions = pipeline.run().await.unwrap();
    assert!(predictions.is_empty());
    // Nothing to write, so no commit happens at all.
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_short_sample_set_produces_no_windows() {
    let samples = vec![sample("a", 0, &[800.0, 810.0]), sample("b", 10, &[790.0])];
    let store = InMemoryStore::with_samples(samples);
    let pipeline = StressPipeline::new(store.clone(), Arc::new(StubScorer), job_config(6));

    let predictions = pipeline.run().await.unwrap();
    assert!(predictions.is_empty());
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_scorer_failure_aborts_without_writes() {
    let samples: Vec<_> = (0..3)
        .map(|i| sample(&format!("d{i}"), i * 10, &[800.0, 820.0]))
        .collect();
    let store = InMemoryStore::with_samples(samples);
    let pipeline = StressPipeline::new(store.clone(), Arc::new(FailingScorer), job_config(3));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, BatchError::Inference(_)));
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_unready_model_aborts_the_run() {
    let samples: Vec<_> = (0..3)
        .map(|i| sample(&format!("d{i}"), i * 10, &[800.0, 820.0]))
        .collect();
    let store = InMemoryStore::with_samples(samples);
    let model = StressModel::with_parts(None, None);
    let pipeline = StressPipeline::new(store.clone(), Arc::new(model), job_config(3));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, BatchError::ModelNotLoaded(_)));
    assert!(store.commits().is_empty());
}
