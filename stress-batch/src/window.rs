//! Time-windowing of heart-rate samples.

use chrono::{DateTime, Utc};
use sentio_common::HeartRateSample;

/// Minimum samples for a window to be scored.
const MIN_WINDOW_SAMPLES: usize = 3;

/// A contiguous, time-ordered run of heart-rate samples. Only exists for the
/// duration of one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    samples: Vec<HeartRateSample>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    fn new(samples: Vec<HeartRateSample>) -> Option<Window> {
        let start = samples.first()?.timestamp;
        let end = samples.last()?.timestamp;
        Some(Window {
            samples,
            start,
            end,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// All inter-beat intervals across the window, in sample order.
    pub fn flatten_intervals(&self) -> Vec<f64> {
        self.samples
            .iter()
            .flat_map(|sample| sample.ibi.iter().copied())
            .collect()
    }
}

/// Sort samples by timestamp and split them into fixed-size windows.
///
/// Timestamp ties are broken by document id, so the partition does not
/// depend on input order. Windows with fewer than three samples (only ever
/// the trailing chunk) are dropped.
pub fn partition(mut samples: Vec<HeartRateSample>, samples_per_window: usize) -> Vec<Window> {
    if samples.is_empty() || samples_per_window == 0 {
        return Vec::new();
    }

    samples.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    samples
        .chunks(samples_per_window)
        .filter(|chunk| chunk.len() >= MIN_WINDOW_SAMPLES)
        .filter_map(|chunk| Window::new(chunk.to_vec()))
        .collect()
}
