// Finite state machine executing navigation sequences
use super::channels::AbortSignal;
use super::config::AutomationConfig;
use super::driver::{ActionDriver, WaitOutcome};
use super::snapshot::{save_debug_snapshot, snapshot_file_name};
use super::types::{
    RunStatus, Sequence, SequenceReport, SequenceStep, StepAction, StepReport, StepStatus,
};
use crate::device::{FrameSource, PointerDevice};
use crate::error::NavError;
use crate::template_matching::{Frame, MatchResult};
use tokio::time::Instant;

/// Mutable execution record of one run
#[derive(Debug)]
pub struct SequenceRun {
    pub current_step: usize,
    pub steps: Vec<StepReport>,
    pub status: RunStatus,
    started: Instant,
}

impl SequenceRun {
    fn new(sequence: &Sequence, default_threshold: f32) -> Self {
        let steps = sequence
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                StepReport::pending(i, step, step.threshold.unwrap_or(default_threshold))
            })
            .collect();
        Self {
            current_step: 0,
            steps,
            status: RunStatus::Running,
            started: Instant::now(),
        }
    }

    fn into_report(self, sequence: &Sequence) -> SequenceReport {
        SequenceReport {
            sequence: sequence.name.clone(),
            status: self.status,
            steps: self.steps,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

/// How a single step ended, before it is folded into the run record
enum StepEnd {
    Succeeded,
    TimedOut,
    Aborted,
    Failed(NavError),
}

pub struct SequenceEngine<S: FrameSource, P: PointerDevice> {
    driver: ActionDriver<S, P>,
    config: AutomationConfig,
    abort: AbortSignal,
    state: RunStatus,
}

impl<S: FrameSource, P: PointerDevice> SequenceEngine<S, P> {
    pub fn new(driver: ActionDriver<S, P>, config: AutomationConfig, abort: AbortSignal) -> Self {
        Self {
            driver,
            config,
            abort,
            state: RunStatus::Idle,
        }
    }

    pub fn state(&self) -> RunStatus {
        self.state
    }

    pub fn driver(&self) -> &ActionDriver<S, P> {
        &self.driver
    }

    fn change_state(&mut self, new_state: RunStatus) {
        if self.state != new_state {
            log::debug!("🎮 Sequence state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
        }
    }

    /// Execute `sequence` step by step and return the final report
    ///
    /// Steps run strictly in order. The first timeout or error ends the run as
    /// Failed; no later step is attempted and nothing is clicked on a screen
    /// that was not recognised. An abort ends the run as Aborted and leaves the
    /// interrupted step Pending.
    pub async fn run(&mut self, sequence: &Sequence) -> SequenceReport {
        if self.state == RunStatus::Running {
            log::warn!("⚠️ Sequence engine already running; starting a new run record");
        }
        // An abort consumed by an earlier run does not carry over
        self.abort.reset();
        let mut run = SequenceRun::new(sequence, self.config.confidence_threshold);
        self.change_state(RunStatus::Running);
        log::info!(
            "🚀 Starting sequence '{}' ({} steps)",
            sequence.name,
            sequence.steps.len()
        );

        for (index, step) in sequence.steps.iter().enumerate() {
            run.current_step = index;
            if self.abort.is_aborted() {
                run.status = RunStatus::Aborted;
                break;
            }

            let started = Instant::now();
            log::info!(
                "🔍 Step {}/{}: looking for '{}'",
                index + 1,
                sequence.steps.len(),
                step.template_name
            );
            let end = self.execute_step(sequence, step, &mut run.steps[index]).await;
            run.steps[index].elapsed_ms = started.elapsed().as_millis() as u64;

            match end {
                StepEnd::Succeeded => {
                    run.steps[index].status = StepStatus::Succeeded;
                }
                StepEnd::TimedOut => {
                    run.steps[index].status = StepStatus::TimedOut;
                    run.status = RunStatus::Failed;
                    break;
                }
                StepEnd::Aborted => {
                    run.status = RunStatus::Aborted;
                    break;
                }
                StepEnd::Failed(e) => {
                    if e.is_configuration_error() {
                        log::error!(
                            "❌ Step {} '{}' cannot run, check the template directory: {}",
                            index + 1,
                            step.template_name,
                            e
                        );
                    } else {
                        log::error!("❌ Step {} '{}' failed: {}", index + 1, step.template_name, e);
                    }
                    run.steps[index].status = StepStatus::Error(e.kind());
                    run.steps[index].error = Some(e.to_string());
                    run.status = RunStatus::Failed;
                    break;
                }
            }
        }

        if run.status == RunStatus::Running {
            run.status = RunStatus::Completed;
        }
        self.change_state(run.status);

        let report = run.into_report(sequence);
        self.log_report(&report);
        report
    }

    async fn execute_step(
        &mut self,
        sequence: &Sequence,
        step: &SequenceStep,
        record: &mut StepReport,
    ) -> StepEnd {
        let outcome = match self
            .driver
            .wait_for_template(
                &step.template_name,
                record.threshold,
                step.max_wait,
                step.poll_interval,
                &mut self.abort,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return StepEnd::Failed(e),
        };
        record.polls = outcome.polls();

        match outcome {
            WaitOutcome::Found {
                point,
                confidence,
                template_size,
                ..
            } => {
                record.best_confidence = Some(confidence);
                let target = match step.action {
                    StepAction::WaitOnly => return StepEnd::Succeeded,
                    StepAction::Click => point,
                    StepAction::ClickOffset { dx, dy } => point.offset(dx, dy),
                    StepAction::ClickLeftOf { gap } => {
                        point.offset(-((template_size.0 / 2) as i32) - gap, 0)
                    }
                };
                if self.abort.is_aborted() {
                    return StepEnd::Aborted;
                }
                let delay = step
                    .post_click_delay
                    .unwrap_or(self.config.click.post_click_delay);
                match self.driver.click_at_with_delay(target, delay).await {
                    Ok(()) => {
                        record.clicked_at = Some(target);
                        StepEnd::Succeeded
                    }
                    Err(e) => StepEnd::Failed(e),
                }
            }
            WaitOutcome::TimedOut {
                best_confidence,
                last_seen,
                ..
            } => {
                record.best_confidence = best_confidence;
                if let Some((frame, candidate)) = last_seen {
                    record.snapshot = self
                        .write_snapshot(sequence, record, &frame, &candidate)
                        .await;
                }
                StepEnd::TimedOut
            }
            WaitOutcome::Aborted { .. } => StepEnd::Aborted,
        }
    }

    async fn write_snapshot(
        &self,
        sequence: &Sequence,
        record: &StepReport,
        frame: &Frame,
        candidate: &MatchResult,
    ) -> Option<String> {
        let directory = self.config.snapshot_dir.as_ref()?;
        let file_name = snapshot_file_name(&sequence.name, record.index, &record.template_name);
        match save_debug_snapshot(directory, &file_name, frame, candidate).await {
            Ok(path) => Some(path.to_string_lossy().to_string()),
            Err(e) => {
                log::warn!("⚠️ {}", e);
                None
            }
        }
    }

    fn log_report(&self, report: &SequenceReport) {
        match report.status {
            RunStatus::Completed => log::info!(
                "✅ Sequence '{}' completed in {}ms",
                report.sequence,
                report.elapsed_ms
            ),
            RunStatus::Aborted => log::info!("⏹️ Sequence '{}' aborted", report.sequence),
            _ => log::warn!("❌ Sequence '{}' {:?}", report.sequence, report.status),
        }
        for step in &report.steps {
            match step.status {
                StepStatus::TimedOut | StepStatus::Error(_) => log::warn!("  {}", step.describe()),
                _ => log::debug!("  {}", step.describe()),
            }
        }
    }
}
