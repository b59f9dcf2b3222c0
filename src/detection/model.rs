use image::RgbImage;
use log::{debug, info, warn};
use ndarray::{Axis, Ix3};
use ort::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider, GraphOptimizationLevel,
    Session,
};

use super::names::ClassNames;
use super::preprocessing::preprocess_image;
use super::{bbox, decode_predictions, Detection, ObjectDetector};
use crate::config::{Config, Device};
use crate::error::{Error, Result};

/// Registers the execution providers for `device` with the global ONNX
/// Runtime environment and returns the device actually in use.
pub fn init_runtime(device: Device) -> Result<Device> {
    let cuda = CUDAExecutionProvider::default();
    let resolved = match device {
        Device::Cpu => Device::Cpu,
        Device::Cuda => Device::Cuda,
        Device::Auto => {
            if cuda.is_available().unwrap_or(false) {
                Device::Cuda
            } else {
                Device::Cpu
            }
        }
    };

    match resolved {
        Device::Cuda => ort::init()
            .with_execution_providers([
                cuda.build(),
                CPUExecutionProvider::default().build(),
            ])
            .commit()?,
        _ => ort::init()
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .commit()?,
    };

    Ok(resolved)
}

/// YOLOv8-style detector backed by an ONNX Runtime session.
pub struct DetectionModel {
    session: Session,
    config: Config,
    input_name: String,
    names: ClassNames,
}

impl DetectionModel {
    pub fn new(config: Config) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(&config.model_path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| Error::Model("model declares no inputs".to_string()))?;

        let names = match &config.names_path {
            Some(path) => ClassNames::from_file(path)?,
            None => names_from_metadata(&session).unwrap_or_else(|| {
                warn!("Model carries no class names, falling back to COCO");
                ClassNames::coco()
            }),
        };

        info!(
            "Model {:?} loaded ({} classes, input {:?})",
            config.model_path,
            names.len(),
            input_name
        );

        Ok(Self {
            session,
            config,
            input_name,
            names,
        })
    }

    pub fn predict(&self, frame: &RgbImage, confidence_threshold: f32) -> Result<Vec<Detection>> {
        let input_array = preprocess_image(frame, &self.config)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_array.view()]?)?;

        let output = outputs[0].try_extract_tensor::<f32>()?;
        let output = output
            .into_dimensionality::<Ix3>()
            .map_err(|err| Error::Model(format!("unexpected output shape: {err}")))?;
        let output = output.index_axis(Axis(0), 0);

        let scale = [
            frame.width() as f32 / self.config.input_width() as f32,
            frame.height() as f32 / self.config.input_height() as f32,
        ];
        let candidates = decode_predictions(
            output,
            confidence_threshold,
            scale,
            [frame.width(), frame.height()],
        );
        let candidate_count = candidates.len();
        let detections = bbox::nms(
            candidates,
            self.config.iou_threshold,
            self.config.max_detections,
        );

        debug!(
            "{} candidates above {:.2}, {} after NMS",
            candidate_count,
            confidence_threshold,
            detections.len()
        );

        Ok(detections)
    }
}

impl ObjectDetector for DetectionModel {
    fn detect(&mut self, frame: &RgbImage, confidence_threshold: f32) -> Result<Vec<Detection>> {
        self.predict(frame, confidence_threshold)
    }

    fn names(&self) -> &ClassNames {
        &self.names
    }
}

fn names_from_metadata(session: &Session) -> Option<ClassNames> {
    let metadata = session.metadata().ok()?;
    let value = metadata.custom("names").ok()??;
    ClassNames::from_metadata(&value)
}
