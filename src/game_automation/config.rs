//! Configuration for template location and sequence execution

use std::path::PathBuf;
use std::time::Duration;

/// Confidence threshold applied when a step does not set its own
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.8;
/// How long a step waits for its template by default
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);
/// Spacing between captures while waiting for a template
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Lower bound on the poll spacing, so a zero interval cannot spin
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Delays around a click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickTiming {
    /// Pause after moving the pointer, before pressing
    pub pre_click_delay: Duration,
    /// Settle time after the click, unless the step overrides it
    pub post_click_delay: Duration,
}

impl Default for ClickTiming {
    fn default() -> Self {
        Self {
            pre_click_delay: Duration::from_millis(200),
            post_click_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Confidence threshold for template matching (0.0 to 1.0)
    pub confidence_threshold: f32,
    pub click: ClickTiming,
    /// Flat directory of template images, file stem = template name
    pub template_dir: PathBuf,
    /// Where annotated frames of timed-out steps are written, if anywhere
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            click: ClickTiming::default(),
            template_dir: PathBuf::from("templates"),
            snapshot_dir: None,
        }
    }
}

impl AutomationConfig {
    /// Check values that would make every run meaningless
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "confidence threshold {} is outside 0.0..=1.0",
                self.confidence_threshold
            ));
        }
        Ok(())
    }
}

/// Configuration preset without click delays, for dry runs and replaying captures
pub fn create_instant_config() -> AutomationConfig {
    AutomationConfig {
        click: ClickTiming {
            pre_click_delay: Duration::ZERO,
            post_click_delay: Duration::ZERO,
        },
        ..AutomationConfig::default()
    }
}
