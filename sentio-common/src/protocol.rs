//! Wire types for the live analysis endpoint.

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::emotion::{EmotionLabel, StressTier};
use crate::face::FaceBox;

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Frame payload: either raw base64 or a `data:image/...;base64,` URL.
    /// Defaults to empty so a missing field is reported as a validation
    /// error rather than a deserialization failure.
    #[serde(default)]
    pub image: String,
}

/// What the analyzer had to say about a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionReading {
    /// No face in the frame, or the frame was dropped by admission control.
    NoFace,
    /// A face was found but classification did not produce a label.
    Analyzing,
    /// A face was found and classified.
    Label(EmotionLabel),
}

impl EmotionReading {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionReading::NoFace => "No Face",
            EmotionReading::Analyzing => "Analyzing...",
            EmotionReading::Label(label) => label.as_str(),
        }
    }

    /// Stress tier shown alongside this reading.
    pub fn stress_tier(&self) -> StressTier {
        match self {
            EmotionReading::Label(label) => label.stress_tier(),
            _ => StressTier::Low,
        }
    }
}

impl Serialize for EmotionReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmotionReading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "No Face" => Ok(EmotionReading::NoFace),
            "Analyzing..." => Ok(EmotionReading::Analyzing),
            other => EmotionLabel::from_name(other)
                .map(EmotionReading::Label)
                .ok_or_else(|| D::Error::custom(format!("unknown emotion reading: {other}"))),
        }
    }
}

/// Response of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub emotion: EmotionReading,
    pub stress_level: StressTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_box: Option<FaceBox>,
}

impl AnalyzeResponse {
    /// The neutral payload returned for dropped or faceless frames.
    pub fn no_face() -> AnalyzeResponse {
        AnalyzeResponse {
            emotion: EmotionReading::NoFace,
            stress_level: StressTier::Low,
            face_box: None,
        }
    }

    /// Degraded payload: a face was located but not classified.
    pub fn analyzing(face_box: FaceBox) -> AnalyzeResponse {
        AnalyzeResponse {
            emotion: EmotionReading::Analyzing,
            stress_level: StressTier::Low,
            face_box: Some(face_box),
        }
    }

    /// Full payload for a classified face.
    pub fn classified(label: EmotionLabel, face_box: FaceBox) -> AnalyzeResponse {
        AnalyzeResponse {
            emotion: EmotionReading::Label(label),
            stress_level: label.stress_tier(),
            face_box: Some(face_box),
        }
    }
}
