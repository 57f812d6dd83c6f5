// Device module - capture and input boundaries of the target application.
// Window discovery and raw screenshot acquisition live outside this crate;
// this module defines the traits they plug into, a screenshot-file source,
// a dry-run pointer and (with the `input` feature) a real mouse pointer.

pub mod dry_run;
#[cfg(feature = "input")]
pub mod enigo_pointer;
pub mod file_source;
pub mod types;

pub use dry_run::DryRunPointer;
#[cfg(feature = "input")]
pub use enigo_pointer::EnigoPointer;
pub use file_source::ScreenshotFileSource;
pub use types::{FrameSource, PointerDevice};
