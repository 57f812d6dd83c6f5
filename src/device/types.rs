// Boundary traits for the capture and input devices
use crate::error::NavResult;
use crate::template_matching::{ActionablePoint, Frame};

// Supplies screenshots of the target application window.
// Every call must return a freshly captured frame; implementations never cache.
#[allow(async_fn_in_trait)]
pub trait FrameSource: Send + Sync {
    /// Fails with `NavError::Capture` when the window is missing, hidden or minimized
    async fn capture_frame(&self) -> NavResult<Frame>;

    fn description(&self) -> String;
}

// Virtual pointer used to click on located templates.
#[allow(async_fn_in_trait)]
pub trait PointerDevice: Send {
    async fn move_to(&mut self, point: ActionablePoint) -> NavResult<()>;

    /// Press and release the primary button at the current position
    async fn click(&mut self) -> NavResult<()>;
}
