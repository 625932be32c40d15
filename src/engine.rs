//! Speech engine collaborator boundary
//!
//! The recognition engine itself (audio capture, acoustic modeling) is
//! external: the gateway only drives its session lifecycle and consumes its
//! event stream. Engines push [`EngineEvent`]s into an mpsc channel the
//! controller consumes, so callback arrival order is preserved as event
//! order.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Result;

/// One `(text, is_final)` pair from a recognition result update
#[derive(Debug, Clone)]
pub struct ResultUpdate {
    pub text: String,
    pub is_final: bool,
}

/// Engine error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCode {
    /// Microphone access denied — fatal until operator restart
    PermissionDenied,
    /// Recognition service refused the session
    ServiceDenied,
    /// Transient failure; the session is restarted
    Transient,
    /// Anything else
    Other,
}

impl EngineErrorCode {
    /// Whether this error forces the gateway into Stopped mode
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::PermissionDenied | Self::ServiceDenied)
    }
}

/// Event delivered by the speech engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Ordered batch of result updates from one engine callback
    Results(Vec<ResultUpdate>),
    /// Engine-reported error
    Error {
        code: EngineErrorCode,
        message: String,
    },
    /// The listening session ended (operator stop or engine-initiated)
    SessionEnded,
}

/// A speech recognition session driver
///
/// `start` begins (or restarts) a listening session; `stop` terminates it.
/// At most one session is live at a time — `start` while running is a no-op.
pub trait SpeechEngine: Send {
    /// Start a listening session
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be started
    fn start(&mut self) -> Result<()>;

    /// Stop the live session, if any
    fn stop(&mut self);
}

/// Stdin-driven engine for hardware-free runs
///
/// Each line typed is delivered as a final transcript; lines prefixed with
/// `~` are delivered as interim results. EOF ends the session.
pub struct TextStreamEngine {
    events: mpsc::Sender<EngineEvent>,
    reader: Option<JoinHandle<()>>,
}

impl TextStreamEngine {
    #[must_use]
    pub const fn new(events: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            events,
            reader: None,
        }
    }
}

impl SpeechEngine for TextStreamEngine {
    fn start(&mut self) -> Result<()> {
        if self.reader.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let events = self.events.clone();
        self.reader = Some(tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let update = trimmed.strip_prefix('~').map_or_else(
                    || ResultUpdate {
                        text: trimmed.to_string(),
                        is_final: true,
                    },
                    |interim| ResultUpdate {
                        text: interim.trim().to_string(),
                        is_final: false,
                    },
                );

                if events.send(EngineEvent::Results(vec![update])).await.is_err() {
                    return;
                }
            }

            tracing::debug!("stdin closed, ending session");
            let _ = events.send(EngineEvent::SessionEnded).await;
        }));

        tracing::debug!("text stream session started");
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
            // The aborted reader can't deliver the end notification itself
            let _ = self.events.try_send(EngineEvent::SessionEnded);
            tracing::debug!("text stream session stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_errors_are_fatal() {
        assert!(EngineErrorCode::PermissionDenied.is_fatal());
        assert!(EngineErrorCode::ServiceDenied.is_fatal());
        assert!(!EngineErrorCode::Transient.is_fatal());
        assert!(!EngineErrorCode::Other.is_fatal());
    }
}
