//! Screen navigation by template matching
//!
//! Locate saved UI templates in captured frames and drive ordered
//! wait-then-click sequences across them.

pub mod device;
pub mod error;
pub mod game_automation;
pub mod template_matching;

pub use error::{NavError, NavResult};
pub use game_automation::{
    ActionDriver, AutomationConfig, Sequence, SequenceEngine, SequenceReport, SequenceStep,
};
pub use template_matching::{ActionablePoint, Frame, Locator, Template, TemplateLibrary};
