//! Emotion classifier backed by an ONNX Runtime session.

use std::sync::Mutex;

use image::imageops::FilterType;
use image::DynamicImage;
use sentio_common::EmotionLabel;

use super::{EmotionClassifier, VisionError};

/// Classifier model input resolution.
const INPUT_SIZE: u32 = 48;

/// Four-class emotion classifier.
///
/// The model takes a 48x48 single-channel face crop scaled to `[0,1]`
/// (NCHW, shape `[1, 1, 48, 48]`) and emits one score per label; the argmax
/// index maps onto [`EmotionLabel::ALL`].
pub struct OnnxEmotionClassifier {
    session: Mutex<ort::session::Session>,
}

impl OnnxEmotionClassifier {
    pub fn load(model_path: &str) -> Result<OnnxEmotionClassifier, VisionError> {
        let session = ort::session::Session::builder()
            .and_then(|mut builder| builder.commit_from_file(model_path))
            .map_err(|err| VisionError::Load(err.to_string()))?;

        Ok(OnnxEmotionClassifier {
            session: Mutex::new(session),
        })
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&self, face: &DynamicImage) -> Result<EmotionLabel, VisionError> {
        let input = to_input_tensor(face);
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|err| VisionError::Classification(err.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::Classification("classifier session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|err| VisionError::Classification(err.to_string()))?;

        if outputs.len() == 0 {
            return Err(VisionError::Classification(
                "classifier produced no outputs".to_string(),
            ));
        }

        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|err| VisionError::Classification(err.to_string()))?;
        let scores = scores
            .as_slice()
            .ok_or_else(|| VisionError::Classification("score tensor not contiguous".to_string()))?;

        let index = argmax(scores).ok_or_else(|| {
            VisionError::Classification("classifier produced an empty score vector".to_string())
        })?;

        EmotionLabel::from_index(index).ok_or_else(|| {
            VisionError::Classification(format!("classifier index {index} out of range"))
        })
    }
}

/// Grayscale, resize to the model resolution, scale to `[0,1]`, pack NCHW.
fn to_input_tensor(face: &DynamicImage) -> ndarray::Array4<f32> {
    let gray = face.to_luma8();
    let resized = image::imageops::resize(&gray, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let size = INPUT_SIZE as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        tensor[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
    }
    tensor
}

fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}
