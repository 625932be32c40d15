//! Wake word detection
//!
//! While the gateway is suspended, only final transcripts are inspected and
//! a case-insensitive substring match against the configured token resumes
//! active listening.

/// Detects the wake token in final transcripts
#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    token: String,
}

impl WakeWordDetector {
    /// Create a detector for the given token (normalized to lowercase)
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            token: token.trim().to_lowercase(),
        }
    }

    /// Case-insensitive substring test
    #[must_use]
    pub fn matches(&self, transcript: &str) -> bool {
        let hit = transcript.to_lowercase().contains(&self.token);
        if hit {
            tracing::info!(token = %self.token, transcript, "wake word detected");
        }
        hit
    }

    /// The configured token
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}
