use image::RgbImage;
use opencv::{
    core::{Mat, Scalar, CV_8UC3},
    highgui,
    prelude::*,
};

use super::Display;
use crate::error::Result;

/// OpenCV HighGUI window.
pub struct Window {
    title: String,
}

impl Window {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

impl Display for Window {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        let mut mat = Mat::new_rows_cols_with_default(
            frame.height() as i32,
            frame.width() as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        let bgr = mat.data_bytes_mut()?;
        for (dst, src) in bgr.chunks_exact_mut(3).zip(frame.as_raw().chunks_exact(3)) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        }
        highgui::imshow(&self.title, &mat)?;
        Ok(())
    }

    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>> {
        let key = highgui::wait_key(delay_ms)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(Some(((key & 0xFF) as u8) as char))
    }

    fn close(&mut self) -> Result<()> {
        highgui::destroy_all_windows()?;
        Ok(())
    }
}
