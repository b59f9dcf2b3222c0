//! Object detection over images, video files and cameras.
//!
//! A source token is classified as a still image or a frame stream, every
//! frame goes through a YOLO model running on ONNX Runtime, and the
//! detections are drawn back onto the frame as boxes and labels.

pub mod cli;
pub mod config;
pub mod detection;
pub mod display;
pub mod drawing;
pub mod error;
pub mod pipeline;
pub mod source;

pub use config::{Config, Device, RunConfig};
pub use detection::{ClassNames, Detection, DetectionModel, ObjectDetector};
pub use error::{Error, Result};
pub use pipeline::RunSummary;
pub use source::{load_source, FrameSource, Source};
