use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, Device, RunConfig};
use crate::detection::download::DEFAULT_DOWNLOAD_URL;
use crate::source::DEFAULT_CAMERA;

/// Run a YOLO object detector over an image, a video file or a camera.
#[derive(Parser, Debug, Clone)]
#[command(name = "object-detection", version, about)]
pub struct Args {
    /// Path to video/image or camera index ('0' for the default webcam)
    #[arg(long, default_value = DEFAULT_CAMERA)]
    pub source: String,

    /// YOLO model file (ONNX); downloaded when missing
    #[arg(long, default_value = "yolov8n.onnx")]
    pub model: PathBuf,

    /// Confidence threshold
    #[arg(long, default_value_t = 0.25)]
    pub conf: f32,

    /// Bounding box thickness
    #[arg(long, default_value_t = 2)]
    pub thickness: u32,

    /// Save detection results to disk
    #[arg(long)]
    pub save: bool,

    /// Directory to save results
    #[arg(long = "save_dir", default_value = "detections")]
    pub save_dir: PathBuf,

    /// IoU threshold for non-maximum suppression
    #[arg(long, default_value_t = 0.7)]
    pub iou: f32,

    /// Maximum detections kept per frame
    #[arg(long = "max_det", default_value_t = 300)]
    pub max_det: usize,

    /// Class names file, one per line (overrides the model's own names)
    #[arg(long)]
    pub names: Option<PathBuf>,

    /// Inference device
    #[arg(long, value_enum, default_value_t = Device::Auto)]
    pub device: Device,

    /// Base URL models are downloaded from
    #[arg(long = "download_url", default_value = DEFAULT_DOWNLOAD_URL)]
    pub download_url: String,

    /// Never open a window
    #[arg(long)]
    pub headless: bool,

    /// ONNX Runtime intra-op threads
    #[arg(long, default_value_t = 4)]
    pub threads: usize,
}

impl Args {
    pub fn model_config(&self) -> Config {
        Config {
            model_path: self.model.clone(),
            names_path: self.names.clone(),
            iou_threshold: self.iou,
            max_detections: self.max_det,
            intra_threads: self.threads,
            device: self.device,
            ..Config::default()
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            confidence_threshold: self.conf,
            thickness: self.thickness,
            save: self.save,
            save_dir: self.save_dir.clone(),
            ..RunConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["object-detection"]);

        assert_eq!(args.source, "0");
        assert_eq!(args.model, PathBuf::from("yolov8n.onnx"));
        assert_eq!(args.conf, 0.25);
        assert_eq!(args.thickness, 2);
        assert!(!args.save);
        assert_eq!(args.save_dir, PathBuf::from("detections"));
        assert_eq!(args.device, Device::Auto);
        assert!(!args.headless);
    }

    #[test]
    fn test_underscored_flags_and_conversions() {
        let args = Args::parse_from([
            "object-detection",
            "--source",
            "street.mp4",
            "--model",
            "weights/yolov8s.onnx",
            "--conf",
            "0.4",
            "--thickness",
            "3",
            "--save",
            "--save_dir",
            "out",
            "--device",
            "cpu",
        ]);

        let run = args.run_config();
        assert_eq!(run.confidence_threshold, 0.4);
        assert_eq!(run.thickness, 3);
        assert!(run.save);
        assert_eq!(run.save_dir, PathBuf::from("out"));

        let model = args.model_config();
        assert_eq!(model.model_path, PathBuf::from("weights/yolov8s.onnx"));
        assert_eq!(model.device, Device::Cpu);
        assert_eq!(model.input_shape, [1, 3, 640, 640]);
    }

    #[test]
    fn test_rejects_unknown_device() {
        assert!(Args::try_parse_from(["object-detection", "--device", "tpu"]).is_err());
    }
}
