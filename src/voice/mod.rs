//! Voice control module
//!
//! Mode state machine, inactivity watchdog and wake word gating. Transcript
//! classification is routed through `classifier` (see `controller.rs`).

pub(crate) mod controller;
mod wake_word;
mod watchdog;

pub use controller::{ControllerHandle, Mode, ModeController};
pub use wake_word::WakeWordDetector;
