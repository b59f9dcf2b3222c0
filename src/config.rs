use std::fmt;
use std::path::PathBuf;

/// Execution device for ONNX Runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Device {
    /// CUDA when the provider is available, CPU otherwise.
    Auto,
    Cpu,
    Cuda,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Auto => write!(f, "auto"),
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

/// Model and inference settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub names_path: Option<PathBuf>,
    pub input_shape: [i64; 4],
    pub input_mean: f32,
    pub input_std: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
    pub device: Device,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("yolov8n.onnx"),
            names_path: None,
            input_shape: [1, 3, 640, 640],
            input_mean: 0.0,
            input_std: 255.0,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
            device: Device::Auto,
        }
    }
}

impl Config {
    pub fn input_width(&self) -> u32 {
        self.input_shape[3] as u32
    }

    pub fn input_height(&self) -> u32 {
        self.input_shape[2] as u32
    }
}

/// Settings for a single run over one source.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub confidence_threshold: f32,
    pub thickness: u32,
    pub save: bool,
    pub save_dir: PathBuf,
    pub window_title: String,
    pub quit_key: char,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            thickness: 2,
            save: false,
            save_dir: PathBuf::from("detections"),
            window_title: "YOLOv8 Detection".to_string(),
            quit_key: 'q',
        }
    }
}
