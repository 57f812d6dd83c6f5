// Action driver: clicks on screen points and polls for templates
use super::channels::AbortSignal;
use super::config::{ClickTiming, MIN_POLL_INTERVAL};
use crate::device::{FrameSource, PointerDevice};
use crate::error::NavResult;
use crate::template_matching::{ActionablePoint, Frame, Locator, MatchResult};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep, sleep_until};

/// Stand-in deadline for waits too long to represent as an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Result of waiting for a template to appear
#[derive(Debug, Clone)]
pub enum WaitOutcome {
    Found {
        point: ActionablePoint,
        confidence: f32,
        /// Matched template size, for actions placed relative to its edges
        template_size: (u32, u32),
        polls: u32,
    },
    /// Not an error: the deadline passed without an acceptable match
    TimedOut {
        polls: u32,
        best_confidence: Option<f32>,
        /// Last captured frame and its best match, for diagnostics
        last_seen: Option<(Frame, MatchResult)>,
    },
    Aborted {
        polls: u32,
    },
}

impl WaitOutcome {
    pub fn point(&self) -> Option<ActionablePoint> {
        match self {
            WaitOutcome::Found { point, .. } => Some(*point),
            _ => None,
        }
    }

    pub fn polls(&self) -> u32 {
        match self {
            WaitOutcome::Found { polls, .. }
            | WaitOutcome::TimedOut { polls, .. }
            | WaitOutcome::Aborted { polls } => *polls,
        }
    }
}

pub struct ActionDriver<S: FrameSource, P: PointerDevice> {
    source: S,
    pointer: Arc<Mutex<P>>,
    locator: Locator,
    timing: ClickTiming,
}

impl<S: FrameSource, P: PointerDevice> ActionDriver<S, P> {
    pub fn new(source: S, pointer: P, locator: Locator, timing: ClickTiming) -> Self {
        Self::with_shared_pointer(source, Arc::new(Mutex::new(pointer)), locator, timing)
    }

    /// Build a driver on a pointer shared with other drivers; clicks are serialized by its lock
    pub fn with_shared_pointer(
        source: S,
        pointer: Arc<Mutex<P>>,
        locator: Locator,
        timing: ClickTiming,
    ) -> Self {
        Self {
            source,
            pointer,
            locator,
            timing,
        }
    }

    pub fn pointer(&self) -> Arc<Mutex<P>> {
        self.pointer.clone()
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Move to `point` and press-release, with the configured delays
    pub async fn click_at(&self, point: ActionablePoint) -> NavResult<()> {
        self.click_at_with_delay(point, self.timing.post_click_delay)
            .await
    }

    /// Like [`ActionDriver::click_at`] with an explicit post-click settle time.
    /// The pointer lock is held for the whole move-press-release.
    pub async fn click_at_with_delay(
        &self,
        point: ActionablePoint,
        post_click_delay: Duration,
    ) -> NavResult<()> {
        {
            let mut pointer = self.pointer.lock().await;
            pointer.move_to(point).await?;
            if !self.timing.pre_click_delay.is_zero() {
                sleep(self.timing.pre_click_delay).await;
            }
            pointer.click().await?;
        }
        log::info!("✅ Clicked at {}", point);
        if !post_click_delay.is_zero() {
            sleep(post_click_delay).await;
        }
        Ok(())
    }

    /// Capture a frame and locate `template_name` in it off the async runtime
    async fn poll_once(
        &self,
        template_name: &str,
        threshold: f32,
    ) -> NavResult<(Frame, Option<ActionablePoint>, MatchResult)> {
        let frame = self.source.capture_frame().await?;
        let locator = self.locator.clone();
        let name = template_name.to_string();
        let (frame, located) = tokio::task::spawn_blocking(move || {
            let located = locator.locate_detailed(&frame, &name, threshold);
            (frame, located)
        })
        .await?;
        let (point, result) = located?;
        Ok((frame, point, result))
    }

    /// Capture and locate repeatedly until `template_name` matches or `max_wait` elapses
    ///
    /// Every poll uses a freshly captured frame and polls start `poll_interval`
    /// apart, measured from the start of the previous poll. At least one capture
    /// is always made. A further poll is skipped when the last poll's
    /// capture-plus-match time shows it could not finish within
    /// `max_wait + poll_interval`. The abort signal is checked before every poll.
    pub async fn wait_for_template(
        &self,
        template_name: &str,
        threshold: f32,
        max_wait: Duration,
        poll_interval: Duration,
        abort: &mut AbortSignal,
    ) -> NavResult<WaitOutcome> {
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        let start = Instant::now();
        let deadline = start
            .checked_add(max_wait)
            .unwrap_or_else(|| start + FAR_FUTURE);
        let mut polls = 0u32;
        let mut best_confidence: Option<f32> = None;
        let mut warned_unmatchable = false;

        loop {
            if abort.is_aborted() {
                return Ok(WaitOutcome::Aborted { polls });
            }

            let poll_started = Instant::now();
            let (frame, point, result) = self.poll_once(template_name, threshold).await?;
            let poll_cost = poll_started.elapsed();
            polls += 1;

            if let Some(point) = point {
                log::debug!(
                    "🎯 '{}' found after {} polls ({}ms)",
                    template_name,
                    polls,
                    start.elapsed().as_millis()
                );
                return Ok(WaitOutcome::Found {
                    point,
                    confidence: result.confidence,
                    template_size: result.template_size,
                    polls,
                });
            }
            if result.found {
                best_confidence = Some(match best_confidence {
                    Some(best) => best.max(result.confidence),
                    None => result.confidence,
                });
            } else if !warned_unmatchable {
                if let Some(reason) = result.unmatchable_reason((frame.width(), frame.height())) {
                    log::warn!("⚠️ '{}' can never match: {}", template_name, reason);
                }
                warned_unmatchable = true;
            }

            let now = Instant::now();
            let next_poll = (poll_started + poll_interval).min(deadline).max(now);
            let out_of_budget = next_poll + poll_cost > deadline + poll_interval;
            if now >= deadline || out_of_budget {
                if out_of_budget && now < deadline {
                    log::debug!(
                        "⏱️ '{}': a poll takes {}ms, no time left for another",
                        template_name,
                        poll_cost.as_millis()
                    );
                }
                log::info!(
                    "⏱️ '{}' not found within {:.1}s ({} polls, best confidence {:?})",
                    template_name,
                    max_wait.as_secs_f64(),
                    polls,
                    best_confidence
                );
                return Ok(WaitOutcome::TimedOut {
                    polls,
                    best_confidence,
                    last_seen: Some((frame, result)),
                });
            }

            sleep_until(next_poll).await;
        }
    }
}
