// Game automation module
// This module drives multi-step navigation: wait for a template on screen,
// click it, move on to the next one.

pub mod channels;
pub mod config;
pub mod driver;
pub mod fsm;
pub mod sequences;
pub mod snapshot;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::{AbortSignal, create_sequence_channels};
pub use config::{AutomationConfig, ClickTiming, create_instant_config};
pub use driver::{ActionDriver, WaitOutcome};
pub use fsm::{SequenceEngine, SequenceRun};
pub use types::{
    RunStatus, Sequence, SequenceCommand, SequenceReport, SequenceStep, StepAction, StepReport,
    StepStatus,
};
