use image::RgbImage;
use log::debug;
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};

use super::{FrameSource, StreamTarget};
use crate::error::{Error, Result};

/// OpenCV `VideoCapture` over a camera index or a video file.
pub struct CvCapture {
    target: StreamTarget,
    capture: VideoCapture,
    frame: Mat,
}

impl CvCapture {
    pub fn open(target: &StreamTarget) -> Result<Self> {
        let capture = match target {
            StreamTarget::Camera(index) => VideoCapture::new(*index as i32, videoio::CAP_ANY)?,
            StreamTarget::Path(path) => VideoCapture::from_file(path, videoio::CAP_ANY)?,
        };
        Ok(Self {
            target: target.clone(),
            capture,
            frame: Mat::default(),
        })
    }
}

impl FrameSource for CvCapture {
    fn read(&mut self) -> Result<Option<RgbImage>> {
        if !self.capture.is_opened()? {
            return Err(Error::capture(self.target.to_string(), "capture is not open"));
        }
        if !self.capture.read(&mut self.frame)? {
            return Ok(None);
        }
        bgr_mat_to_rgb(&self.frame)
            .map(Some)
            .ok_or_else(|| Error::capture(self.target.to_string(), "unsupported frame layout"))
    }

    fn release(&mut self) -> Result<()> {
        self.capture.release()?;
        debug!("Released {}", self.target);
        Ok(())
    }
}

fn bgr_mat_to_rgb(mat: &Mat) -> Option<RgbImage> {
    if mat.channels() != 3 || !mat.is_continuous() {
        return None;
    }
    let width = mat.cols() as u32;
    let height = mat.rows() as u32;
    let bytes = mat.data_bytes().ok()?;

    let mut rgb = Vec::with_capacity(bytes.len());
    for pixel in bytes.chunks_exact(3) {
        rgb.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
    }
    RgbImage::from_raw(width, height, rgb)
}
