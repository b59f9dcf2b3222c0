use std::io::{ErrorKind, Read};
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;
use log::{debug, info};

use super::{FrameSource, StreamTarget};
use crate::error::{Error, Result};

/// Decodes a video file, URL or camera through an `ffmpeg` child process
/// writing packed `rgb24` frames to stdout.
///
/// Nothing is spawned until the first [`FrameSource::read`]; a source that
/// cannot be probed or decoded fails there.
pub struct FfmpegSource {
    target: StreamTarget,
    ffmpeg: String,
    ffprobe: String,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    size: (u32, u32),
    finished: bool,
}

impl FfmpegSource {
    pub fn new(target: StreamTarget) -> Self {
        Self::with_programs(target, "ffmpeg", "ffprobe")
    }

    pub fn with_programs(
        target: StreamTarget,
        ffmpeg: impl Into<String>,
        ffprobe: impl Into<String>,
    ) -> Self {
        Self {
            target,
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            child: None,
            stdout: None,
            size: (0, 0),
            finished: false,
        }
    }

    fn uri(&self) -> String {
        self.target.to_string()
    }

    fn start(&mut self) -> Result<()> {
        let (width, height) = self.probe()?;

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(decoder_args(&self.target, (width, height)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd
            .spawn()
            .map_err(|err| Error::capture(self.uri(), format!("failed to spawn {}: {err}", self.ffmpeg)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::capture(self.uri(), "failed to capture ffmpeg stdout"))?;

        info!("Decoding {} at {}x{}", self.target, width, height);
        self.size = (width, height);
        self.stdout = Some(stdout);
        self.child = Some(child);
        Ok(())
    }

    fn probe(&self) -> Result<(u32, u32)> {
        let output = Command::new(&self.ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=width,height")
            .arg("-of")
            .arg("csv=s=x:p=0")
            .args(input_args(&self.target))
            .stdin(Stdio::null())
            .output()
            .map_err(|err| Error::capture(self.uri(), format!("failed to run {}: {err}", self.ffprobe)))?;

        if !output.status.success() {
            return Err(Error::capture(
                self.uri(),
                format!(
                    "ffprobe exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        parse_dimensions(&text)
            .ok_or_else(|| Error::capture(self.uri(), format!("no video stream found ({text:?})")))
    }
}

impl FrameSource for FfmpegSource {
    fn read(&mut self) -> Result<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }
        if self.stdout.is_none() {
            self.start()?;
        }

        let (width, height) = self.size;
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        let stdout = self
            .stdout
            .as_mut()
            .ok_or_else(|| Error::capture(self.target.to_string(), "decoder is not running"))?;

        match stdout.read_exact(&mut buffer) {
            Ok(()) => RgbImage::from_raw(width, height, buffer)
                .map(Some)
                .ok_or_else(|| Error::capture(self.uri(), "frame buffer size mismatch")),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                debug!("{} reached end of stream", self.target);
                self.finished = true;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn release(&mut self) -> Result<()> {
        self.finished = true;
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                child.kill()?;
            }
            child.wait()?;
            debug!("Released {}", self.target);
        }
        Ok(())
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Full ffmpeg argument list decoding `target` into `size` rgb24 frames.
///
/// Rotation metadata is ignored and the output is scaled to `size`, so every
/// frame matches the probed geometry even when the stream's resolution
/// changes midway.
pub fn decoder_args(target: &StreamTarget, size: (u32, u32)) -> Vec<String> {
    let (width, height) = size;
    let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-noautorotate"]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
    args.extend(input_args(target));
    args.extend([
        "-vf".to_string(),
        format!("scale={width}:{height}"),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-".to_string(),
    ]);
    args
}

/// ffmpeg input options selecting `target`.
pub fn input_args(target: &StreamTarget) -> Vec<String> {
    match target {
        StreamTarget::Camera(index) => camera_args(*index),
        StreamTarget::Path(path) => vec!["-i".to_string(), path.clone()],
    }
}

#[cfg(target_os = "macos")]
fn camera_args(index: u32) -> Vec<String> {
    vec![
        "-f".to_string(),
        "avfoundation".to_string(),
        "-i".to_string(),
        format!("{index}"),
    ]
}

#[cfg(not(target_os = "macos"))]
fn camera_args(index: u32) -> Vec<String> {
    vec![
        "-f".to_string(),
        "video4linux2".to_string(),
        "-i".to_string(),
        format!("/dev/video{index}"),
    ]
}

/// Parses ffprobe's `WIDTHxHEIGHT` csv output.
pub fn parse_dimensions(text: &str) -> Option<(u32, u32)> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let mut parts = line.trim_end_matches('x').split('x');
    let width = parts.next()?.trim().parse().ok()?;
    let height = parts.next()?.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1280x720\n"), Some((1280, 720)));
        assert_eq!(parse_dimensions("\n640x480x\n"), Some((640, 480)));
        assert_eq!(parse_dimensions(""), None);
        assert_eq!(parse_dimensions("0x0"), None);
        assert_eq!(parse_dimensions("N/A"), None);
    }

    #[test]
    fn test_input_args_for_file() {
        assert_eq!(
            input_args(&StreamTarget::Path("clip.mp4".to_string())),
            vec!["-i", "clip.mp4"]
        );
    }

    #[test]
    fn test_decoder_args_pin_geometry() {
        let args = decoder_args(&StreamTarget::Path("portrait.mp4".to_string()), (1920, 1080));
        let position = |needle: &str| args.iter().position(|arg| arg == needle).unwrap();

        assert!(position("-noautorotate") < position("-i"));
        assert_eq!(args[position("-vf") + 1], "scale=1920:1080");
        assert!(position("-i") < position("-vf"));
        assert_eq!(args[position("-pix_fmt") + 1], "rgb24");
        assert_eq!(args[position("-f") + 1], "rawvideo");
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_input_args_for_camera() {
        assert_eq!(
            input_args(&StreamTarget::Camera(1)),
            vec!["-f", "video4linux2", "-i", "/dev/video1"]
        );
    }

    #[test]
    fn test_missing_decoder_fails_on_first_read() {
        let mut source = FfmpegSource::with_programs(
            StreamTarget::Path("clip.mp4".to_string()),
            "object-detection-no-such-ffmpeg",
            "object-detection-no-such-ffprobe",
        );

        match source.read() {
            Err(Error::Capture { uri, .. }) => assert_eq!(uri, "clip.mp4"),
            other => panic!("expected capture error, got {:?}", other.map(|f| f.is_some())),
        }
        assert!(source.release().is_ok());
    }

    #[test]
    fn test_release_without_start() {
        let mut source = FfmpegSource::new(StreamTarget::Camera(0));
        assert!(source.release().is_ok());
        assert!(source.read().unwrap().is_none());
    }
}
