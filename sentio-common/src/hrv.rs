//! Heart-rate documents and batch stress predictions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One document from the `heart_rate_data` collection. Immutable once
/// written; the batch job only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Document id in the store.
    pub doc_id: String,
    pub timestamp: DateTime<Utc>,
    /// Inter-beat intervals recorded for this sample, in milliseconds.
    #[serde(default)]
    pub ibi: Vec<f64>,
}

/// Three-class stress level produced by the batch classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressClass {
    Low,
    Medium,
    High,
}

impl StressClass {
    /// All classes, in classifier index order.
    pub const ALL: [StressClass; 3] = [StressClass::Low, StressClass::Medium, StressClass::High];

    /// Map a classifier output index to a class.
    pub fn from_index(index: i64) -> Option<StressClass> {
        match index {
            0 => Some(StressClass::Low),
            1 => Some(StressClass::Medium),
            2 => Some(StressClass::High),
            _ => None,
        }
    }

    pub fn index(&self) -> i64 {
        match self {
            StressClass::Low => 0,
            StressClass::Medium => 1,
            StressClass::High => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressClass::Low => "low",
            StressClass::Medium => "medium",
            StressClass::High => "high",
        }
    }
}

/// Per-class probabilities reported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressProbabilities {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl StressProbabilities {
    pub fn for_class(&self, class: StressClass) -> f64 {
        match class {
            StressClass::Low => self.low,
            StressClass::Medium => self.medium,
            StressClass::High => self.high,
        }
    }
}

/// One scored window, written to the `stress_predictions` collection.
/// Created by the batch pipeline, written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressPrediction {
    pub stress: StressClass,
    pub probabilities: StressProbabilities,
    pub sdnn: f64,
    pub rmssd: f64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub prediction_timestamp: DateTime<Utc>,
    pub num_samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_round_trip() {
        for class in StressClass::ALL {
            assert_eq!(StressClass::from_index(class.index()), Some(class));
        }
        assert_eq!(StressClass::from_index(3), None);
        assert_eq!(StressClass::from_index(-1), None);
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(StressClass::Low.label(), "low");
        assert_eq!(StressClass::Medium.label(), "medium");
        assert_eq!(StressClass::High.label(), "high");
    }

    #[test]
    fn test_probability_lookup() {
        let probs = StressProbabilities {
            low: 0.2,
            medium: 0.3,
            high: 0.5,
        };
        assert_eq!(probs.for_class(StressClass::High), 0.5);
        assert_eq!(probs.for_class(StressClass::Low), 0.2);
    }

    #[test]
    fn test_sample_deserialization_defaults_ibi() {
        let sample: HeartRateSample = serde_json::from_str(
            r#"{"doc_id": "abc", "timestamp": "2025-06-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(sample.ibi.is_empty());
    }
}
