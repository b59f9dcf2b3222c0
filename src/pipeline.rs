//! Detect, annotate, show and optionally save, for one still image or for
//! every frame of a stream.

use std::fs;
use std::path::PathBuf;

use image::RgbImage;
use log::{debug, info, warn};

use crate::config::RunConfig;
use crate::detection::ObjectDetector;
use crate::display::Display;
use crate::drawing::draw_boxes;
use crate::error::Result;
use crate::source::{FrameSource, Source};

/// File written in `save_dir` for a still image.
pub const IMAGE_OUTPUT: &str = "detected_image.jpg";

/// File written in `save_dir` for streams, replaced on every frame.
pub const STREAM_OUTPUT: &str = "frame_detected.jpg";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub detections: usize,
    pub saved: Option<PathBuf>,
    pub stopped_by_user: bool,
}

/// Dispatches to the still-image or the stream branch.
pub fn run<D, V>(
    source: Source,
    detector: &mut D,
    display: &mut V,
    config: &RunConfig,
) -> Result<RunSummary>
where
    D: ObjectDetector + ?Sized,
    V: Display + ?Sized,
{
    match source {
        Source::Still(image) => run_image(image, detector, display, config),
        Source::Stream(mut stream) => run_stream(stream.as_mut(), detector, display, config),
    }
}

/// Annotates one image, shows it, saves it when asked and waits for a key.
pub fn run_image<D, V>(
    mut image: RgbImage,
    detector: &mut D,
    display: &mut V,
    config: &RunConfig,
) -> Result<RunSummary>
where
    D: ObjectDetector + ?Sized,
    V: Display + ?Sized,
{
    prepare_save_dir(config)?;

    let detections = annotate(&mut image, detector, config)?;
    display.show(&image)?;

    let mut summary = RunSummary {
        frames: 1,
        detections,
        ..RunSummary::default()
    };

    if config.save {
        let path = config.save_dir.join(IMAGE_OUTPUT);
        image.save(&path)?;
        info!("Saved result to {path:?}");
        summary.saved = Some(path);
    }

    display.wait_key(0)?;
    display.close()?;
    Ok(summary)
}

/// Runs until the stream ends, a read fails, or the quit key is pressed.
/// The source is released and the display closed however the loop ends.
pub fn run_stream<S, D, V>(
    source: &mut S,
    detector: &mut D,
    display: &mut V,
    config: &RunConfig,
) -> Result<RunSummary>
where
    S: FrameSource + ?Sized,
    D: ObjectDetector + ?Sized,
    V: Display + ?Sized,
{
    info!(
        "Running on video/camera feed (press '{}' to quit)...",
        config.quit_key
    );

    let outcome = stream_loop(source, detector, display, config);
    let released = source.release();
    let closed = display.close();

    let summary = outcome?;
    released?;
    closed?;

    info!(
        "Processed {} frames, {} detections",
        summary.frames, summary.detections
    );
    Ok(summary)
}

fn stream_loop<S, D, V>(
    source: &mut S,
    detector: &mut D,
    display: &mut V,
    config: &RunConfig,
) -> Result<RunSummary>
where
    S: FrameSource + ?Sized,
    D: ObjectDetector + ?Sized,
    V: Display + ?Sized,
{
    prepare_save_dir(config)?;
    let mut summary = RunSummary::default();

    loop {
        let mut frame = match source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                warn!("Frame read failed, stopping: {err}");
                break;
            }
        };
        summary.frames += 1;

        summary.detections += annotate(&mut frame, detector, config)?;
        display.show(&frame)?;

        if config.save {
            let path = config.save_dir.join(STREAM_OUTPUT);
            frame.save(&path)?;
            summary.saved = Some(path);
        }

        if display.wait_key(1)? == Some(config.quit_key) {
            info!("Stopped by user");
            summary.stopped_by_user = true;
            break;
        }
    }

    Ok(summary)
}

fn annotate<D>(frame: &mut RgbImage, detector: &mut D, config: &RunConfig) -> Result<usize>
where
    D: ObjectDetector + ?Sized,
{
    let detections = detector.detect(frame, config.confidence_threshold)?;
    debug!("{} detections", detections.len());
    draw_boxes(frame, &detections, detector.names(), config.thickness);
    Ok(detections.len())
}

fn prepare_save_dir(config: &RunConfig) -> Result<()> {
    if config.save {
        fs::create_dir_all(&config.save_dir)?;
    }
    Ok(())
}
