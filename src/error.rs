//! Error types for object-detection-rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model file {0:?} not found")]
    ModelNotFound(PathBuf),

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Video source {uri:?}: {message}")]
    Capture { uri: String, message: String },

    #[cfg(feature = "highgui")]
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn capture(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Capture {
            uri: uri.into(),
            message: message.into(),
        }
    }
}
