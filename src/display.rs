//! Display collaborator
//!
//! The display consumes core output and never feeds it: mode changes,
//! timestamped transcript log entries, the busy indicator and the final
//! command text. [`ConsoleDisplay`] writes everything through `tracing`.

use crate::voice::Mode;

/// Operator-facing strings for a mode change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeAnnouncement {
    /// Badge label (e.g. "Activo")
    pub label: &'static str,
    /// Status line
    pub status: String,
    /// Hint line
    pub hint: String,
}

impl ModeAnnouncement {
    /// Build the announcement for a mode, with the inactivity threshold
    /// interpolated into the Active hint.
    #[must_use]
    pub fn for_mode(mode: Mode, inactivity: std::time::Duration) -> Self {
        match mode {
            Mode::Initializing => Self {
                label: "Inicializando…",
                status: "Preparando reconocimiento…".to_string(),
                hint: "Permite el micrófono si se solicita.".to_string(),
            },
            Mode::Active => Self {
                label: "Activo",
                status: "Escuchando órdenes…".to_string(),
                hint: format!(
                    "Di una orden. Si no hay voz por {}s → suspendido.",
                    inactivity.as_secs()
                ),
            },
            Mode::Suspended => Self {
                label: "Suspendido",
                status: "Modo suspendido (wake listening)…".to_string(),
                hint: "Di \"Alexa\" para despertar.".to_string(),
            },
            Mode::Stopped => Self {
                label: "Detenido",
                status: "Reconocimiento detenido.".to_string(),
                hint: "Presiona Iniciar para reactivar.".to_string(),
            },
        }
    }
}

/// Consumer of operator-facing gateway output
pub trait Display: Send {
    /// Mode changed
    fn mode_changed(&mut self, mode: Mode, announcement: &ModeAnnouncement);

    /// Append a transcript log entry (`Interim:`, `Final:`, `SYS:`, `IA:`, …)
    fn log(&mut self, label: &str, text: &str);

    /// Toggle the busy indicator around a classification call
    fn set_busy(&mut self, busy: bool);

    /// Show the final validated command
    fn show_command(&mut self, command: &str);
}

/// Console display writing through `tracing`
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl Display for ConsoleDisplay {
    fn mode_changed(&mut self, mode: Mode, announcement: &ModeAnnouncement) {
        tracing::info!(
            ?mode,
            label = announcement.label,
            status = %announcement.status,
            hint = %announcement.hint,
            "mode changed"
        );
    }

    fn log(&mut self, label: &str, text: &str) {
        let ts = chrono::Local::now().format("%H:%M:%S");
        tracing::info!("[{ts}] {label} {text}");
    }

    fn set_busy(&mut self, busy: bool) {
        tracing::debug!(busy, "classifier busy indicator");
    }

    fn show_command(&mut self, command: &str) {
        tracing::info!(command, "final command");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn active_hint_interpolates_threshold() {
        let a = ModeAnnouncement::for_mode(Mode::Active, Duration::from_millis(7000));
        assert_eq!(a.label, "Activo");
        assert!(a.hint.contains("7s"));
    }

    #[test]
    fn stopped_announcement() {
        let a = ModeAnnouncement::for_mode(Mode::Stopped, Duration::from_secs(7));
        assert_eq!(a.label, "Detenido");
    }
}
