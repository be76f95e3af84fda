//! BlazeFace-style face detector backed by an ONNX Runtime session.

use std::sync::Mutex;

use image::imageops::FilterType;
use image::DynamicImage;
use sentio_common::FaceBox;

use super::{FaceDetection, FaceDetector, VisionError};

/// Detector model input resolution.
const INPUT_SIZE: u32 = 128;

/// Number of anchors in the short-range model.
const NUM_ANCHORS: usize = 896;

/// Short-range face detector.
///
/// The model takes a 128x128 RGB frame normalized to `[0,1]` (NCHW) and
/// emits per-anchor box regressors plus confidence logits. Only the single
/// highest-scoring anchor is decoded; the live endpoint never aggregates
/// multi-face frames.
pub struct OnnxFaceDetector {
    session: Mutex<ort::session::Session>,
    min_confidence: f32,
    anchors: Vec<[f32; 2]>,
}

impl OnnxFaceDetector {
    pub fn load(model_path: &str, min_confidence: f32) -> Result<OnnxFaceDetector, VisionError> {
        let session = ort::session::Session::builder()
            .and_then(|mut builder| builder.commit_from_file(model_path))
            .map_err(|err| VisionError::Load(err.to_string()))?;

        Ok(OnnxFaceDetector {
            session: Mutex::new(session),
            min_confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&self, frame: &DynamicImage) -> Result<Option<FaceDetection>, VisionError> {
        let input = to_input_tensor(frame);
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|err| VisionError::Detection(err.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::Detection("detector session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|err| VisionError::Detection(err.to_string()))?;

        // Two outputs: box regressors [1, 896, 16] and confidence logits
        // [1, 896, 1].
        if outputs.len() < 2 {
            return Err(VisionError::Detection(format!(
                "detector expected 2 outputs, got {}",
                outputs.len()
            )));
        }

        let regressors = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|err| VisionError::Detection(err.to_string()))?;
        let scores = outputs[1]
            .try_extract_array::<f32>()
            .map_err(|err| VisionError::Detection(err.to_string()))?;

        let reg_data = regressors
            .as_slice()
            .ok_or_else(|| VisionError::Detection("regressor tensor not contiguous".to_string()))?;
        let score_data = scores
            .as_slice()
            .ok_or_else(|| VisionError::Detection("score tensor not contiguous".to_string()))?;

        Ok(self.decode_best(reg_data, score_data, frame.width(), frame.height()))
    }
}

impl OnnxFaceDetector {
    /// Decode the single highest-confidence anchor, if any clears the
    /// threshold.
    fn decode_best(
        &self,
        reg_data: &[f32],
        score_data: &[f32],
        frame_width: u32,
        frame_height: u32,
    ) -> Option<FaceDetection> {
        let count = self.anchors.len().min(score_data.len()).min(NUM_ANCHORS);

        let mut best: Option<(usize, f32)> = None;
        for i in 0..count {
            let score = sigmoid(score_data[i]);
            if score < self.min_confidence {
                continue;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        let (index, score) = best?;
        let reg_offset = index * 16;
        if reg_offset + 4 > reg_data.len() {
            return None;
        }

        let anchor = self.anchors[index];
        let size = INPUT_SIZE as f32;
        let cx = anchor[0] + reg_data[reg_offset] / size;
        let cy = anchor[1] + reg_data[reg_offset + 1] / size;
        let w = reg_data[reg_offset + 2] / size;
        let h = reg_data[reg_offset + 3] / size;

        let face_box = FaceBox::from_relative(
            cx - w / 2.0,
            cy - h / 2.0,
            w,
            h,
            frame_width,
            frame_height,
        );

        Some(FaceDetection { face_box, score })
    }
}

/// Resize a frame to the model resolution and pack it as a normalized NCHW
/// tensor.
fn to_input_tensor(frame: &DynamicImage) -> ndarray::Array4<f32> {
    let resized = frame
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }
    tensor
}

/// Anchor centers for the short-range model: 2 per cell on the 16x16 feature
/// map, 6 per cell on the 8x8 map.
fn generate_anchors() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    for y in 0..16 {
        for x in 0..16 {
            for _ in 0..2 {
                anchors.push([(x as f32 + 0.5) / 16.0, (y as f32 + 0.5) / 16.0]);
            }
        }
    }
    for y in 0..8 {
        for x in 0..8 {
            for _ in 0..6 {
                anchors.push([(x as f32 + 0.5) / 8.0, (y as f32 + 0.5) / 8.0]);
            }
        }
    }
    anchors
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
