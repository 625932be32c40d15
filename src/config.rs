//! Gateway configuration
//!
//! The core is configured by a small set of compile-time constants: wake
//! token, inactivity threshold, command alphabet, classifier model and the
//! collaborator endpoints. [`Config`] gathers them into one record so tests
//! can shrink the timings.

use std::time::Duration;

/// Wake token that resumes listening from suspension
pub const WAKE_WORD: &str = "alexa";

/// No-speech duration in Active mode before auto-suspending
pub const INACTIVITY_THRESHOLD: Duration = Duration::from_millis(7000);

/// Inactivity watchdog poll cadence
pub const WATCHDOG_PERIOD: Duration = Duration::from_millis(250);

/// Classifier model identifier
pub const CLASSIFIER_MODEL: &str = "gpt-4o-mini";

/// Classifier responses endpoint
pub const CLASSIFIER_URL: &str = "https://api.openai.com/v1/responses";

/// Credential store endpoint (first record carries the `apikey` field)
pub const KEY_STORE_URL: &str =
    "https://698a177ac04d974bc6a15346.mockapi.io/api/v1/apyKey";

/// Runtime configuration for the gateway
#[derive(Debug, Clone)]
pub struct Config {
    /// Wake token matched (case-insensitively) against final transcripts
    pub wake_word: String,
    /// No-speech duration before Active → Suspended
    pub inactivity_threshold: Duration,
    /// Watchdog tick period
    pub watchdog_period: Duration,
    /// Classifier model identifier
    pub classifier_model: String,
    /// Classifier endpoint URL
    pub classifier_url: String,
    /// Credential store endpoint URL
    pub key_store_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wake_word: WAKE_WORD.to_string(),
            inactivity_threshold: INACTIVITY_THRESHOLD,
            watchdog_period: WATCHDOG_PERIOD,
            classifier_model: CLASSIFIER_MODEL.to_string(),
            classifier_url: CLASSIFIER_URL.to_string(),
            key_store_url: KEY_STORE_URL.to_string(),
        }
    }
}
