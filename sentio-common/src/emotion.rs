//! Emotion labels and the stress tier derived from them.

use serde::{Deserialize, Serialize};

/// The four emotion classes the frame classifier can produce.
///
/// Variant order matches the classifier's output index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionLabel {
    Fatigue,
    Happy,
    Sad,
    Stress,
}

impl EmotionLabel {
    /// All label variants, in classifier output order.
    pub const ALL: [EmotionLabel; 4] = [
        EmotionLabel::Fatigue,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Stress,
    ];

    /// Map a classifier output index to a label.
    pub fn from_index(index: usize) -> Option<EmotionLabel> {
        Self::ALL.get(index).copied()
    }

    /// Parse a label from its wire name.
    pub fn from_name(name: &str) -> Option<EmotionLabel> {
        Self::ALL.iter().find(|label| label.as_str() == name).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Fatigue => "Fatigue",
            EmotionLabel::Happy => "Happy",
            EmotionLabel::Sad => "Sad",
            EmotionLabel::Stress => "Stress",
        }
    }

    /// Stress tier shown for this label.
    pub fn stress_tier(&self) -> StressTier {
        match self {
            EmotionLabel::Stress | EmotionLabel::Sad => StressTier::High,
            EmotionLabel::Fatigue => StressTier::Medium,
            _ => StressTier::Low,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse stress tier reported alongside an emotion reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressTier {
    Low,
    Medium,
    High,
}

impl StressTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressTier::Low => "Low",
            StressTier::Medium => "Medium",
            StressTier::High => "High",
        }
    }
}

impl std::fmt::Display for StressTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
