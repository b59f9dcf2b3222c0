use std::borrow::Cow;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// COCO class names (80 classes), the label set of the stock YOLOv8 weights.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack",
    "umbrella", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball",
    "kite", "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple",
    "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair",
    "couch", "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator",
    "book", "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Largest class id accepted from model metadata.
const MAX_CLASS_ID: usize = 100_000;

/// Class id to display name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn coco() -> Self {
        Self::new(COCO_CLASSES.iter().copied())
    }

    /// Parses the `names` entry Ultralytics writes into exported ONNX
    /// metadata, e.g. `{0: 'person', 1: 'bicycle'}`. Ids missing from the
    /// map are filled with their number. Ids above a sane bound reject the
    /// whole table.
    pub fn from_metadata(value: &str) -> Option<Self> {
        let pattern = Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).ok()?;

        let mut entries = Vec::new();
        for caps in pattern.captures_iter(value) {
            let id: usize = caps[1].parse().ok()?;
            if id > MAX_CLASS_ID {
                return None;
            }
            let name = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
            entries.push((id, name));
        }
        if entries.is_empty() {
            return None;
        }

        let len = entries.iter().map(|(id, _)| id + 1).max().unwrap_or(0);
        let mut names: Vec<String> = (0..len).map(|id| id.to_string()).collect();
        for (id, name) in entries {
            names[id] = name;
        }
        Some(Self { names })
    }

    /// Reads one class name per line; blank lines are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let names: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if names.is_empty() {
            return Err(Error::Model(format!("class names file {path:?} is empty")));
        }
        Ok(Self::new(names))
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Name for `class_id`, or the id itself when the table has no entry.
    pub fn label(&self, class_id: usize) -> Cow<'_, str> {
        match self.get(class_id) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(class_id.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::coco()
    }
}
