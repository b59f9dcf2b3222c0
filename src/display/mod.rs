#[cfg(feature = "highgui")]
pub mod window;

use image::RgbImage;
use log::debug;

use crate::error::Result;

/// Where annotated frames are shown, and where key presses come from.
pub trait Display {
    fn show(&mut self, frame: &RgbImage) -> Result<()>;

    /// Waits up to `delay_ms` for a key press; `0` blocks until one arrives.
    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>>;

    fn close(&mut self) -> Result<()>;
}

/// Display that shows nothing and never sees a key press.
#[derive(Debug, Default)]
pub struct Headless {
    shown: u64,
}

impl Headless {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_shown(&self) -> u64 {
        self.shown
    }
}

impl Display for Headless {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        self.shown += 1;
        debug!(
            "Frame {} ready ({}x{})",
            self.shown,
            frame.width(),
            frame.height()
        );
        Ok(())
    }

    fn wait_key(&mut self, _delay_ms: i32) -> Result<Option<char>> {
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Picks the window display when it is compiled in and wanted.
#[cfg(feature = "highgui")]
pub fn open_display(title: &str, headless: bool) -> Box<dyn Display> {
    if headless {
        Box::new(Headless::new())
    } else {
        Box::new(window::Window::new(title))
    }
}

#[cfg(not(feature = "highgui"))]
pub fn open_display(_title: &str, _headless: bool) -> Box<dyn Display> {
    Box::new(Headless::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_counts_frames_and_never_blocks() {
        let mut display = Headless::new();
        let frame = RgbImage::new(4, 4);

        display.show(&frame).unwrap();
        display.show(&frame).unwrap();

        assert_eq!(display.frames_shown(), 2);
        assert_eq!(display.wait_key(0).unwrap(), None);
        assert!(display.close().is_ok());
    }
}
