//! Frame source backed by a screenshot file kept current by an external capturer

use super::types::FrameSource;
use crate::error::{NavError, NavResult};
use crate::template_matching::Frame;
use std::path::PathBuf;

/// Re-reads `path` on every capture; `origin` is the window's top-left corner on screen
#[derive(Debug, Clone)]
pub struct ScreenshotFileSource {
    path: PathBuf,
    origin: (i32, i32),
}

impl ScreenshotFileSource {
    pub fn new(path: impl Into<PathBuf>, origin: (i32, i32)) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

impl FrameSource for ScreenshotFileSource {
    async fn capture_frame(&self) -> NavResult<Frame> {
        let start = std::time::Instant::now();
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            NavError::capture(format!("screenshot {:?} unavailable: {e}", self.path))
        })?;
        let image = image::load_from_memory(&bytes).map_err(|e| {
            NavError::capture(format!("screenshot {:?} could not be decoded: {e}", self.path))
        })?;
        let frame = Frame::from_dynamic(&image, self.origin);
        log::debug!(
            "📸 Captured {}x{} frame from {:?} ({}ms)",
            frame.width(),
            frame.height(),
            self.path,
            start.elapsed().as_millis()
        );
        Ok(frame)
    }

    fn description(&self) -> String {
        format!("screenshot file {:?} at origin {:?}", self.path, self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[tokio::test]
    async fn test_capture_reads_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.png");
        GrayImage::from_pixel(8, 6, Luma([42])).save(&path).unwrap();

        let source = ScreenshotFileSource::new(&path, (-1920, 15));
        let frame = source.capture_frame().await.unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert_eq!(frame.origin(), (-1920, 15));

        // A new screenshot replaces the old one between captures
        GrayImage::from_pixel(10, 4, Luma([7])).save(&path).unwrap();
        let frame = source.capture_frame().await.unwrap();
        assert_eq!((frame.width(), frame.height()), (10, 4));
    }

    #[tokio::test]
    async fn test_missing_screenshot_is_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScreenshotFileSource::new(dir.path().join("gone.png"), (0, 0));
        assert!(matches!(
            source.capture_frame().await,
            Err(NavError::Capture { .. })
        ));
    }
}
