//! Face bounding boxes in frame pixel coordinates.

use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in pixel coordinates of the source frame.
///
/// Serialized on the wire as `[x, y, width, height]`. The origin is always
/// non-negative; detectors can emit slightly negative coordinates for faces
/// touching the frame edge and those are clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> FaceBox {
        FaceBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a pixel box from detector output in normalized `[0,1]` frame
    /// coordinates. The origin is clamped to zero and the extent to the frame
    /// bounds so the box is always croppable.
    pub fn from_relative(
        x_min: f32,
        y_min: f32,
        width: f32,
        height: f32,
        frame_width: u32,
        frame_height: u32,
    ) -> FaceBox {
        let x = (x_min * frame_width as f32).floor().max(0.0) as u32;
        let y = (y_min * frame_height as f32).floor().max(0.0) as u32;
        let w = (width * frame_width as f32).round().max(0.0) as u32;
        let h = (height * frame_height as f32).round().max(0.0) as u32;
        FaceBox {
            x: x.min(frame_width),
            y: y.min(frame_height),
            width: w.min(frame_width - x.min(frame_width)),
            height: h.min(frame_height - y.min(frame_height)),
        }
    }
}

impl From<FaceBox> for [i64; 4] {
    fn from(b: FaceBox) -> [i64; 4] {
        [b.x as i64, b.y as i64, b.width as i64, b.height as i64]
    }
}

impl From<[i64; 4]> for FaceBox {
    fn from(raw: [i64; 4]) -> FaceBox {
        FaceBox {
            x: raw[0].max(0) as u32,
            y: raw[1].max(0) as u32,
            width: raw[2].max(0) as u32,
            height: raw[3].max(0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_relative_clamps_negative_origin() {
        // A face hanging off the top-left corner.
        let b = FaceBox::from_relative(-0.1, -0.05, 0.5, 0.5, 640, 480);
        assert_eq!(b.x, 0);
        assert_eq!(b.y, 0);
    }

    #[test]
    fn test_from_relative_plain() {
        let b = FaceBox::from_relative(0.25, 0.5, 0.5, 0.25, 640, 480);
        assert_eq!(b, FaceBox::new(160, 240, 320, 120));
    }

    #[test]
    fn test_from_relative_clamps_extent_to_frame() {
        let b = FaceBox::from_relative(0.75, 0.75, 0.5, 0.5, 640, 480);
        assert_eq!(b.x, 480);
        assert_eq!(b.y, 360);
        assert_eq!(b.width, 160);
        assert_eq!(b.height, 120);
    }

    #[test]
    fn test_wire_format_is_array() {
        let b = FaceBox::new(10, 20, 30, 40);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[10,20,30,40]");

        let parsed: FaceBox = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn test_negative_wire_values_clamped() {
        let parsed: FaceBox = serde_json::from_str("[-5,-1,30,40]").unwrap();
        assert_eq!(parsed, FaceBox::new(0, 0, 30, 40));
    }
}
