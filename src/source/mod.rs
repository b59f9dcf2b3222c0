//! Input sources.
//!
//! A source token is either a still image, decoded once up front, or a
//! stream (video file, URL or camera index) that yields frames until it runs
//! dry. Classification looks at the file extension only; nothing is opened
//! or sniffed to decide.
//!
//! Streams are decoded by an `ffmpeg` child process, or by OpenCV when the
//! `highgui` feature is enabled.

pub mod ffmpeg;
#[cfg(feature = "highgui")]
pub mod capture;

use std::fmt;

use image::RgbImage;
use log::info;

use crate::error::Result;
pub use ffmpeg::FfmpegSource;

/// Extensions treated as still images (compared case-insensitively).
pub const IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "dng", "webp", "mpo"];

/// Token selecting the default camera.
pub const DEFAULT_CAMERA: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Still,
    Stream,
}

/// Decides how `token` will be read. The extension is whatever follows the
/// last `.`; a token without one is compared whole.
pub fn classify(token: &str) -> SourceKind {
    let extension = token.rsplit('.').next().unwrap_or(token).to_lowercase();
    if IMAGE_FORMATS.contains(&extension.as_str()) {
        SourceKind::Still
    } else {
        SourceKind::Stream
    }
}

/// Where a stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    Camera(u32),
    Path(String),
}

impl StreamTarget {
    pub fn parse(token: &str) -> Self {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = token.parse() {
                return StreamTarget::Camera(index);
            }
        }
        StreamTarget::Path(token.to_string())
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamTarget::Camera(index) => write!(f, "camera {index}"),
            StreamTarget::Path(path) => write!(f, "{path}"),
        }
    }
}

/// A handle producing frames one at a time.
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended.
    fn read(&mut self) -> Result<Option<RgbImage>>;

    /// Frees the underlying decoder or device. Safe to call more than once.
    fn release(&mut self) -> Result<()>;
}

pub enum Source {
    Still(RgbImage),
    Stream(Box<dyn FrameSource>),
}

/// Opens `token` as a still image or a frame stream.
pub fn load_source(token: &str) -> Result<Source> {
    match classify(token) {
        SourceKind::Still => {
            let image = image::open(token)?.to_rgb8();
            info!(
                "Loaded image {token} ({}x{})",
                image.width(),
                image.height()
            );
            Ok(Source::Still(image))
        }
        SourceKind::Stream => {
            let target = StreamTarget::parse(token);
            info!("Opening stream {target}");
            Ok(Source::Stream(open_stream(target)?))
        }
    }
}

#[cfg(not(feature = "highgui"))]
fn open_stream(target: StreamTarget) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(FfmpegSource::new(target)))
}

#[cfg(feature = "highgui")]
fn open_stream(target: StreamTarget) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(capture::CvCapture::open(&target)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_are_still() {
        for token in [
            "photo.jpg",
            "photo.JPG",
            "dir/scan.Tiff",
            "a.b.c.png",
            "shot.webp",
            "raw.DNG",
            "burst.mpo",
            "x.jpeg",
            "x.tif",
        ] {
            assert_eq!(classify(token), SourceKind::Still, "{token}");
        }
    }

    #[test]
    fn test_everything_else_is_stream() {
        for token in [
            "0",
            "1",
            "clip.mp4",
            "clip.MOV",
            "rtsp://camera.local/stream",
            "photo.jpg.mp4",
            "noextension",
            "",
            "image.gif",
        ] {
            assert_eq!(classify(token), SourceKind::Stream, "{token}");
        }
    }

    #[test]
    fn test_bare_extension_token() {
        assert_eq!(classify("png"), SourceKind::Still);
    }

    #[test]
    fn test_stream_target_parse() {
        assert_eq!(StreamTarget::parse("0"), StreamTarget::Camera(0));
        assert_eq!(StreamTarget::parse("2"), StreamTarget::Camera(2));
        assert_eq!(
            StreamTarget::parse("video.mp4"),
            StreamTarget::Path("video.mp4".to_string())
        );
        assert_eq!(StreamTarget::parse(""), StreamTarget::Path(String::new()));
        assert_eq!(StreamTarget::parse("-1"), StreamTarget::Path("-1".to_string()));
    }

    #[test]
    fn test_load_missing_still_image_fails() {
        assert!(load_source("/definitely/missing/photo.jpg").is_err());
    }

    #[test]
    fn test_load_still_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.PNG");
        RgbImage::new(8, 6).save_with_format(&path, image::ImageFormat::Png).unwrap();

        let source = load_source(path.to_str().unwrap()).unwrap();
        match source {
            Source::Still(image) => assert_eq!(image.dimensions(), (8, 6)),
            Source::Stream(_) => panic!("expected a still image"),
        }
    }
}
