//! Frame annotation: one box and one label per detection.

pub mod rectangle;
pub mod text;

use image::{Rgb, RgbImage};

use crate::detection::{ClassNames, Detection};

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Gap between the top edge of a box and the baseline of its label.
pub const LABEL_OFFSET: i32 = 10;

/// Drawing surface the annotator paints on.
pub trait Canvas {
    fn draw_rectangle(&mut self, corners: [i32; 4], color: Rgb<u8>, thickness: u32);

    /// Draws `text` with its bottom-left corner at `origin`.
    fn draw_label(&mut self, text: &str, origin: (i32, i32), color: Rgb<u8>, thickness: u32);
}

impl Canvas for RgbImage {
    fn draw_rectangle(&mut self, corners: [i32; 4], color: Rgb<u8>, thickness: u32) {
        rectangle::draw_rectangle(self, corners, color, thickness);
    }

    fn draw_label(&mut self, text: &str, origin: (i32, i32), color: Rgb<u8>, thickness: u32) {
        let (_, height) = text::text_size(text, thickness);
        let top = origin.1.saturating_sub(height as i32);
        text::draw_text(self, text, origin.0, top, color, thickness);
    }
}

/// `"<class name> <confidence>"` with two decimals, e.g. `person 0.87`.
pub fn label_text(detection: &Detection, names: &ClassNames) -> String {
    format!("{} {:.2}", names.label(detection.class_id), detection.confidence)
}

/// Draws every detection onto `canvas` in the order given; later boxes
/// paint over earlier ones.
pub fn draw_boxes<C: Canvas + ?Sized>(
    canvas: &mut C,
    detections: &[Detection],
    names: &ClassNames,
    thickness: u32,
) {
    for detection in detections {
        let corners = [
            detection.bbox[0] as i32,
            detection.bbox[1] as i32,
            detection.bbox[2] as i32,
            detection.bbox[3] as i32,
        ];
        let label = label_text(detection, names);

        canvas.draw_rectangle(corners, BOX_COLOR, thickness);
        canvas.draw_label(
            &label,
            (corners[0], corners[1].saturating_sub(LABEL_OFFSET)),
            BOX_COLOR,
            thickness,
        );
    }
}
