//! Inactivity watchdog
//!
//! A fixed-interval ticker that is live only while the gateway is actively
//! listening for commands. The watchdog never touches controller state: each
//! tick is delivered as an event into the dispatcher channel and the
//! controller performs the elapsed-time comparison there. A tick already
//! queued when the mode leaves Active is discarded by the mode check on the
//! consuming side.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::controller::Event;

/// Periodic tick source for the inactivity check
pub(crate) struct InactivityWatchdog {
    period: Duration,
    events: mpsc::Sender<Event>,
    ticker: Option<JoinHandle<()>>,
}

impl InactivityWatchdog {
    pub(crate) const fn new(period: Duration, events: mpsc::Sender<Event>) -> Self {
        Self {
            period,
            events,
            ticker: None,
        }
    }

    /// Start ticking. No-op while already running — there is never more than
    /// one live timer.
    pub(crate) fn start(&mut self) {
        if self.ticker.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let period = self.period;
        let events = self.events.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                if events.send(Event::WatchdogTick).await.is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(period_ms = self.period.as_millis(), "watchdog started");
    }

    /// Stop ticking. Safe to call when not running.
    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            tracing::debug!("watchdog stopped");
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for InactivityWatchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_at_the_configured_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut watchdog = InactivityWatchdog::new(Duration::from_millis(250), tx);
        watchdog.start();

        tokio::time::advance(Duration::from_millis(260)).await;
        assert!(matches!(rx.recv().await, Some(Event::WatchdogTick)));

        tokio::time::advance(Duration::from_millis(250)).await;
        assert!(matches!(rx.recv().await, Some(Event::WatchdogTick)));
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut watchdog = InactivityWatchdog::new(Duration::from_millis(250), tx);
        watchdog.start();
        watchdog.start();
        assert!(watchdog.is_running());

        // One live timer: exactly one tick per period
        tokio::time::advance(Duration::from_millis(260)).await;
        assert!(matches!(rx.recv().await, Some(Event::WatchdogTick)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_silences_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut watchdog = InactivityWatchdog::new(Duration::from_millis(250), tx);
        watchdog.start();
        watchdog.stop();
        watchdog.stop();
        assert!(!watchdog.is_running());

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_err());
    }
}
