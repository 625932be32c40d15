//! Error types for the Mando gateway
//!
//! Engine-side failures (permission denial, transient recognition errors)
//! travel as [`crate::EngineEvent::Error`] codes, not as `Error` values, so
//! the taxonomy here covers only the HTTP collaborators.

use thiserror::Error;

/// Result type alias for Mando operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Mando gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Credential store fetch error
    #[error("credential error: {0}")]
    Credential(String),

    /// Classifier request error (non-2xx, transport failure, or bad body)
    #[error("classification error: {0}")]
    Classification(String),
}
