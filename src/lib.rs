//! Mando Gateway - voice-controlled command interface for robot movement orders
//!
//! This library provides the core of the gateway:
//! - Listening-mode state machine with an inactivity watchdog and wake word gating
//! - Transcript routing with final-result deduplication
//! - Command normalization and validation against a fixed alphabet
//! - Classifier and credential-store collaborator clients
//!
//! # Architecture
//!
//! ```text
//! speech engine ──▶ TranscriptRouter ──▶ ModeController (mode check)
//!                                          │
//!                       Suspended ─────────┼───────── Active
//!                          │                             │
//!                   WakeWordDetector            ClassifierClient
//!                                                        │
//!                                        CommandNormalizer → Validator
//!                                                        │
//!                                                     Display
//! ```

pub mod classifier;
pub mod command;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod providers;
pub mod voice;

pub use classifier::{ClassifierClient, CommandClassifier};
pub use config::Config;
pub use display::{ConsoleDisplay, Display, ModeAnnouncement};
pub use engine::{EngineErrorCode, EngineEvent, ResultUpdate, SpeechEngine, TextStreamEngine};
pub use error::{Error, Result};
pub use providers::KeyResolver;
pub use voice::{ControllerHandle, Mode, ModeController, WakeWordDetector};
