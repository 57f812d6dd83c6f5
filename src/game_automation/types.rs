// Types and enums for sequence execution
use super::config::{DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL};
use crate::error::FailureKind;
use crate::template_matching::ActionablePoint;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepAction {
    /// Click the template centre
    Click,
    /// Click relative to the template centre
    ClickOffset { dx: i32, dy: i32 },
    /// Click `gap` pixels left of the template's left edge, at its vertical centre
    ClickLeftOf { gap: i32 },
    /// Only wait for the template to appear
    WaitOnly,
}

/// Seconds to a duration; negative and NaN give zero, overflow gives `Duration::MAX`
fn saturating_secs(secs: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) => duration,
        Err(_) if secs > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

/// One navigation step: wait for a template, then act on it
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStep {
    pub template_name: String,
    pub action: StepAction,
    pub max_wait: Duration,
    pub poll_interval: Duration,
    /// Overrides the configured confidence threshold
    pub threshold: Option<f32>,
    /// Overrides the configured post-click settle time
    pub post_click_delay: Option<Duration>,
}

impl SequenceStep {
    pub fn new(template_name: impl Into<String>, action: StepAction) -> Self {
        Self {
            template_name: template_name.into(),
            action,
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            threshold: None,
            post_click_delay: None,
        }
    }

    pub fn click(template_name: impl Into<String>) -> Self {
        Self::new(template_name, StepAction::Click)
    }

    pub fn wait_only(template_name: impl Into<String>) -> Self {
        Self::new(template_name, StepAction::WaitOnly)
    }

    pub fn click_offset(template_name: impl Into<String>, dx: i32, dy: i32) -> Self {
        Self::new(template_name, StepAction::ClickOffset { dx, dy })
    }

    pub fn click_left_of(template_name: impl Into<String>, gap: i32) -> Self {
        Self::new(template_name, StepAction::ClickLeftOf { gap })
    }

    pub fn with_max_wait_secs(mut self, secs: f64) -> Self {
        self.max_wait = saturating_secs(secs);
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: f64) -> Self {
        self.poll_interval = saturating_secs(secs);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_post_click_delay_secs(mut self, secs: f64) -> Self {
        self.post_click_delay = Some(saturating_secs(secs));
        self
    }

    pub fn issues_click(&self) -> bool {
        !matches!(self.action, StepAction::WaitOnly)
    }
}

/// An ordered list of steps with a display name
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub name: String,
    pub steps: Vec<SequenceStep>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, steps: Vec<SequenceStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Template names referenced by the steps, in order of first use
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for step in &self.steps {
            if !names.contains(&step.template_name.as_str()) {
                names.push(&step.template_name);
            }
        }
        names
    }
}

/// Run lifecycle: Idle -> Running -> {Completed, Failed, Aborted}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Failed,
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Aborted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Pending,
    Succeeded,
    TimedOut,
    Error(FailureKind),
}

#[derive(Debug, Clone)]
pub enum SequenceCommand {
    Abort,
}

/// Outcome of one step, with enough detail to tell a stale template from a
/// too-strict threshold or an unexpected screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub template_name: String,
    pub action: StepAction,
    pub threshold: f32,
    pub max_wait_secs: f64,
    pub status: StepStatus,
    /// Frames captured while waiting
    pub polls: u32,
    /// Highest confidence seen on any poll
    pub best_confidence: Option<f32>,
    pub clicked_at: Option<ActionablePoint>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub snapshot: Option<String>,
}

impl StepReport {
    pub fn pending(index: usize, step: &SequenceStep, threshold: f32) -> Self {
        Self {
            index,
            template_name: step.template_name.clone(),
            action: step.action,
            threshold,
            max_wait_secs: step.max_wait.as_secs_f64(),
            status: StepStatus::Pending,
            polls: 0,
            best_confidence: None,
            clicked_at: None,
            error: None,
            elapsed_ms: 0,
            snapshot: None,
        }
    }

    /// One-line human readable diagnosis
    pub fn describe(&self) -> String {
        let confidence = self
            .best_confidence
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "n/a".to_string());
        let mut line = format!(
            "step {} '{}' {:?}: threshold {:.2}, best confidence {}, {} polls in {}ms",
            self.index + 1,
            self.template_name,
            self.status,
            self.threshold,
            confidence,
            self.polls,
            self.elapsed_ms
        );
        if let Some(error) = &self.error {
            line.push_str(&format!(" ({error})"));
        }
        line
    }
}

/// Final report of a sequence run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceReport {
    pub sequence: String,
    pub status: RunStatus,
    pub steps: Vec<StepReport>,
    pub elapsed_ms: u64,
}

impl SequenceReport {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// The step that ended the run, when it ended Failed
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::TimedOut | StepStatus::Error(_)))
    }

    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(|s| s.status).collect()
    }

    pub fn click_count(&self) -> usize {
        self.steps.iter().filter(|s| s.clicked_at.is_some()).count()
    }
}
