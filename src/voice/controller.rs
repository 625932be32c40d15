//! Listening-mode state machine and event dispatcher
//!
//! The controller owns all mutable listening state — current mode, the
//! watchdog clock, the dedup key, the manual-stop flag — and is the only
//! mutator of it. Everything else (engine, watchdog, operator, in-flight
//! classifications) communicates intents as events over one mpsc channel,
//! consumed by a single serialized loop. Engine events are forwarded into
//! that same channel, so the order of an operator request relative to an
//! engine callback is the order they were sent, and no state mutation can
//! race.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::classifier::CommandClassifier;
use crate::command::{self, NOT_RECOGNIZED};
use crate::config::Config;
use crate::display::{Display, ModeAnnouncement};
use crate::engine::{EngineErrorCode, EngineEvent, ResultUpdate, SpeechEngine};
use crate::{Error, Result};

use super::watchdog::InactivityWatchdog;
use super::WakeWordDetector;

/// Dispatcher channel capacity
const EVENT_CAPACITY: usize = 64;

/// Listening mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Entry state, not re-enterable
    Initializing,
    /// Listening for commands
    Active,
    /// Listening only for the wake word
    Suspended,
    /// Operator-stopped (or permission-denied)
    Stopped,
}

/// Internal dispatcher event
#[derive(Debug)]
pub(crate) enum Event {
    /// Operator start request
    Start,
    /// Operator stop request
    Stop,
    /// Operator suspend request
    Suspend,
    /// Inactivity watchdog tick
    WatchdogTick,
    /// Classification completion for dispatch `seq`
    Classified {
        seq: u64,
        outcome: Result<String>,
    },
    /// Forwarded speech engine event
    Engine(EngineEvent),
    /// The engine's sending side is gone
    EngineClosed,
}

/// Cloneable handle for sending operator requests into the dispatcher
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<Event>,
}

impl ControllerHandle {
    /// Request a transition to Active (start listening)
    pub async fn request_start(&self) {
        let _ = self.tx.send(Event::Start).await;
    }

    /// Request a transition to Stopped (operator stop)
    pub async fn request_stop(&self) {
        let _ = self.tx.send(Event::Stop).await;
    }

    /// Request a transition to Suspended
    pub async fn request_suspend(&self) {
        let _ = self.tx.send(Event::Suspend).await;
    }
}

/// The listening-mode state machine
pub struct ModeController {
    config: Config,
    engine: Box<dyn SpeechEngine>,
    display: Box<dyn Display>,
    classifier: Arc<dyn CommandClassifier>,
    wake: WakeWordDetector,
    watchdog: InactivityWatchdog,
    events_tx: mpsc::Sender<Event>,
    events_rx: mpsc::Receiver<Event>,
    mode: Mode,
    manual_stop: bool,
    last_heard_at: Instant,
    /// Case-folded last-dispatched final transcript; cleared on every
    /// transition into or out of Active
    dedup_key: Option<String>,
    /// Sequence of the most recent dispatch
    next_seq: u64,
    /// Highest dispatch sequence whose completion has been applied
    applied_seq: u64,
}

impl ModeController {
    /// Create a controller and its operator handle.
    ///
    /// `engine_rx` is the receiving side of the channel the speech engine
    /// pushes its events into. Its events are folded into the dispatcher
    /// channel as they arrive, so one queue defines the order across all
    /// sources.
    #[must_use]
    pub fn new(
        config: Config,
        engine: Box<dyn SpeechEngine>,
        mut engine_rx: mpsc::Receiver<EngineEvent>,
        display: Box<dyn Display>,
        classifier: Arc<dyn CommandClassifier>,
    ) -> (Self, ControllerHandle) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        let wake = WakeWordDetector::new(&config.wake_word);
        let watchdog = InactivityWatchdog::new(config.watchdog_period, events_tx.clone());

        let forward_tx = events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = engine_rx.recv().await {
                if forward_tx.send(Event::Engine(event)).await.is_err() {
                    return;
                }
            }
            let _ = forward_tx.send(Event::EngineClosed).await;
        });

        let controller = Self {
            config,
            engine,
            display,
            classifier,
            wake,
            watchdog,
            events_tx: events_tx.clone(),
            events_rx,
            mode: Mode::Initializing,
            manual_stop: false,
            last_heard_at: Instant::now(),
            dedup_key: None,
            next_seq: 0,
            applied_seq: 0,
        };

        (controller, ControllerHandle { tx: events_tx })
    }

    /// Run the dispatcher until the engine event channel closes
    pub async fn run(mut self) {
        self.announce_mode();

        while let Some(event) = self.events_rx.recv().await {
            if matches!(event, Event::EngineClosed) {
                tracing::debug!("engine event channel closed");
                break;
            }
            self.handle_event(event);
        }

        self.watchdog.stop();
        tracing::info!("controller stopped");
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start => self.enter_active(),
            Event::Stop => self.enter_stopped(true),
            Event::Suspend => self.enter_suspended(),
            Event::WatchdogTick => self.on_watchdog_tick(),
            Event::Classified { seq, outcome } => self.on_classified(seq, outcome),
            Event::Engine(event) => self.handle_engine_event(event),
            Event::EngineClosed => {}
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Results(updates) => self.on_results(&updates),
            EngineEvent::Error { code, message } => self.on_engine_error(code, &message),
            EngineEvent::SessionEnded => self.on_session_ended(),
        }
    }

    // -- Transitions --
    //
    // Each entry method tolerates a request for the mode already current as
    // a no-op, and stops the watchdog before the mode value leaves Active so
    // no stray tick can act after exit.

    /// Initializing/Stopped/Suspended → Active
    fn enter_active(&mut self) {
        if self.mode == Mode::Active {
            return;
        }

        self.set_mode(Mode::Active);
        self.start_session();
        self.last_heard_at = Instant::now();
        self.watchdog.start();
    }

    /// any → Suspended; the listening session stays alive for wake detection
    fn enter_suspended(&mut self) {
        if self.mode == Mode::Suspended {
            return;
        }

        self.watchdog.stop();
        self.set_mode(Mode::Suspended);
        self.start_session();
    }

    /// Active/Suspended → Stopped; `operator` marks an operator-initiated
    /// stop, which suppresses the session auto-restart
    fn enter_stopped(&mut self, operator: bool) {
        if self.mode == Mode::Stopped {
            return;
        }

        if operator {
            self.manual_stop = true;
        }
        self.watchdog.stop();
        self.set_mode(Mode::Stopped);
        self.engine.stop();
    }

    fn set_mode(&mut self, mode: Mode) {
        let was_active = self.mode == Mode::Active;
        self.mode = mode;

        // Dedup key is scoped to one stay in Active
        if was_active || mode == Mode::Active {
            self.dedup_key = None;
        }

        self.announce_mode();
    }

    fn announce_mode(&mut self) {
        let announcement = ModeAnnouncement::for_mode(self.mode, self.config.inactivity_threshold);
        self.display.mode_changed(self.mode, &announcement);
    }

    fn start_session(&mut self) {
        self.manual_stop = false;
        if let Err(e) = self.engine.start() {
            tracing::error!(error = %e, "failed to start listening session");
            self.display.log("ASR_ERR:", &e.to_string());
        }
    }

    // -- Watchdog --

    fn on_watchdog_tick(&mut self) {
        if self.mode != Mode::Active {
            // Tick queued before the watchdog was stopped
            return;
        }

        if self.last_heard_at.elapsed() >= self.config.inactivity_threshold {
            self.display.log("SYS:", "Inactividad → entrando a SUSPENDIDO.");
            self.enter_suspended();
        }
    }

    // -- Transcript routing --

    fn on_results(&mut self, updates: &[ResultUpdate]) {
        let mut interim = String::new();
        let mut finals = String::new();

        for update in updates {
            let text = update.text.trim();
            if text.is_empty() {
                continue;
            }
            let target = if update.is_final { &mut finals } else { &mut interim };
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(text);
        }

        if !interim.is_empty() || !finals.is_empty() {
            self.last_heard_at = Instant::now();
        }

        if !interim.is_empty() {
            self.display.log("Interim:", &interim);
        }

        if finals.is_empty() {
            return;
        }
        self.display.log("Final:", &finals);

        match self.mode {
            Mode::Suspended => {
                if self.wake.matches(&finals) {
                    self.display.log("SYS:", "Wake word detectada → entrando a ACTIVO.");
                    self.enter_active();
                }
                // No classification for wake-check finals
            }
            Mode::Active => {
                let key = finals.to_lowercase();
                if self.dedup_key.as_deref() == Some(key.as_str()) {
                    tracing::debug!(transcript = %finals, "duplicate final, dropped");
                    return;
                }
                self.dedup_key = Some(key);
                self.dispatch_classification(finals);
            }
            Mode::Initializing | Mode::Stopped => {}
        }
    }

    // -- Classification --

    fn dispatch_classification(&mut self, text: String) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.display.set_busy(true);

        let classifier = Arc::clone(&self.classifier);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = classifier.classify(&text).await;
            let _ = events.send(Event::Classified { seq, outcome }).await;
        });
    }

    fn on_classified(&mut self, seq: u64, outcome: Result<String>) {
        self.display.set_busy(false);

        // Completions may arrive out of dispatch order; one from an earlier
        // dispatch never overwrites a later applied result
        if seq <= self.applied_seq {
            tracing::debug!(seq, applied = self.applied_seq, "stale completion discarded");
            return;
        }

        match outcome {
            Ok(raw) => {
                self.applied_seq = seq;
                let logged = if raw.is_empty() { "(sin texto)" } else { raw.as_str() };
                self.display.log("IA:", logged);

                let normalized = command::normalize(&raw);
                let final_command = if command::is_allowed(&normalized) {
                    normalized
                } else {
                    self.display.log(
                        "SYS:",
                        &format!("Salida no válida \"{raw}\". Forzando: {NOT_RECOGNIZED}"),
                    );
                    NOT_RECOGNIZED.to_string()
                };

                self.display.show_command(&final_command);
            }
            Err(e) => {
                let label = if matches!(e, Error::Credential(_)) {
                    "MOCKAPI_ERR:"
                } else {
                    "OPENAI_ERR:"
                };
                tracing::warn!(error = %e, "classification failed");
                self.display.log(label, &e.to_string());
            }
        }
    }

    // -- Engine notifications --

    fn on_engine_error(&mut self, code: EngineErrorCode, message: &str) {
        self.display.log("ASR_ERR:", &format!("{code:?} {message}"));

        if code.is_fatal() {
            tracing::error!(?code, message, "recognition permission denied");
            self.enter_stopped(false);
        }
        // Transient/other errors only get logged; the engine ends the
        // session itself and on_session_ended restarts it
    }

    fn on_session_ended(&mut self) {
        if self.manual_stop {
            return;
        }
        if matches!(self.mode, Mode::Active | Mode::Suspended) {
            tracing::debug!(mode = ?self.mode, "session ended, restarting");
            self.start_session();
        }
    }
}
