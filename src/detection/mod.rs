pub mod bbox;
pub mod download;
pub mod model;
pub mod names;
pub mod preprocessing;

use image::RgbImage;
use ndarray::ArrayView2;

use crate::error::Result;
pub use model::DetectionModel;
pub use names::ClassNames;

/// One predicted object: class, score, and `[x1, y1, x2, y2]` in frame pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

/// Anything that turns a frame into detections.
pub trait ObjectDetector {
    /// Runs inference on `frame`, reporting detections scoring at least
    /// `confidence_threshold`.
    fn detect(&mut self, frame: &RgbImage, confidence_threshold: f32) -> Result<Vec<Detection>>;

    fn names(&self) -> &ClassNames;
}

/// Decodes a YOLOv8 head of shape `[4 + classes, proposals]`.
///
/// Each column holds `cx, cy, w, h` in model-input pixels followed by one
/// score per class. Boxes are mapped back to the source frame with `scale`
/// and clipped to `frame_size`. No suppression happens here.
pub fn decode_predictions(
    output: ArrayView2<f32>,
    confidence_threshold: f32,
    scale: [f32; 2],
    frame_size: [u32; 2],
) -> Vec<Detection> {
    let rows = output.shape()[0];
    if rows <= 4 {
        return Vec::new();
    }
    let proposals = output.shape()[1];
    let max_x = frame_size[0] as f32;
    let max_y = frame_size[1] as f32;

    let mut detections = Vec::new();

    for i in 0..proposals {
        let mut class_id = 0;
        let mut confidence = f32::MIN;
        for c in 4..rows {
            let score = output[[c, i]];
            if score > confidence {
                confidence = score;
                class_id = c - 4;
            }
        }

        if confidence < confidence_threshold {
            continue;
        }

        let corners = bbox::center_to_corners(
            [output[[0, i]], output[[1, i]]],
            [output[[2, i]], output[[3, i]]],
        );

        detections.push(Detection {
            class_id,
            confidence,
            bbox: [
                (corners[0] * scale[0]).clamp(0.0, max_x),
                (corners[1] * scale[1]).clamp(0.0, max_y),
                (corners[2] * scale[0]).clamp(0.0, max_x),
                (corners[3] * scale[1]).clamp(0.0, max_y),
            ],
        });
    }

    detections
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    // Two classes, three proposals.
    fn head() -> Array2<f32> {
        Array2::from_shape_vec(
            (6, 3),
            vec![
                100.0, 300.0, 600.0, // cx
                100.0, 300.0, 10.0, // cy
                20.0, 40.0, 100.0, // w
                40.0, 40.0, 100.0, // h
                0.90, 0.10, 0.05, // class 0
                0.05, 0.30, 0.60, // class 1
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_decode_filters_by_best_class_score() {
        let output = head();
        let detections = decode_predictions(output.view(), 0.25, [1.0, 1.0], [640, 640]);

        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].class_id, 0);
        assert!((detections[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(detections[0].bbox, [90.0, 80.0, 110.0, 120.0]);
        assert_eq!(detections[1].class_id, 1);
        assert_eq!(detections[2].class_id, 1);

        let strict = decode_predictions(output.view(), 0.5, [1.0, 1.0], [640, 640]);
        assert_eq!(strict.len(), 2);
    }

    #[test]
    fn test_decode_scales_and_clips_to_frame() {
        let output = head();
        let detections = decode_predictions(output.view(), 0.5, [2.0, 0.5], [1280, 320]);

        assert_eq!(detections[0].bbox, [180.0, 40.0, 220.0, 60.0]);
        // third proposal spills past the top and right edges
        let clipped = &detections[1];
        assert_eq!(clipped.bbox[1], 0.0);
        assert_eq!(clipped.bbox[2], 1280.0);
    }

    #[test]
    fn test_decode_without_class_rows() {
        let output = Array2::<f32>::zeros((4, 10));
        assert!(decode_predictions(output.view(), 0.0, [1.0, 1.0], [10, 10]).is_empty());
    }
}
