//! Broadcast state machine with a command/notification worker.
//!
//! The controller keeps the user's intent (enabled, active link) and derives
//! the visible [`BroadcastState`] from it synchronously. Hardware work is
//! queued to a worker on a blocking thread, which reports back through a
//! notification channel drained by [`BroadcastController::poll_events`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::{BroadcastError, EmitterError};
use crate::hardware::{EmissionSession, HardwareEmitter};

/// What the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastState {
    /// No hardware, or the probe has not finished yet.
    Unsupported,
    /// Hardware present, emission off.
    Idle,
    /// Enabled, waiting for an active link.
    Armed,
    /// Enabled and advertising the active link.
    Emitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareAvailability {
    Unknown,
    Present,
    Absent,
}

/// Snapshot of the runtime broadcast session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSession {
    pub current_url: Option<String>,
    pub user_enabled: bool,
    pub hardware_available: HardwareAvailability,
    pub emitting: bool,
}

// ---------------------------------------------------------------------------
// Command / notification types
// ---------------------------------------------------------------------------

/// Commands sent *into* the emitter worker. Start and Stop carry the
/// generation they were issued under.
#[derive(Debug)]
enum EmitterCommand {
    /// Stop any current emission, then advertise this link.
    Start { generation: u64, url: String },
    /// Stop the current emission, if any.
    Stop { generation: u64 },
    /// Reply once every earlier command has been handled.
    Barrier(oneshot::Sender<()>),
    /// Stop emitting and exit.
    Shutdown,
}

/// Notifications sent *from* the emitter worker.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EmitterNotification {
    Probed {
        available: bool,
    },
    Started {
        generation: u64,
        url: String,
    },
    Stopped,
    Failed {
        generation: u64,
        url: Option<String>,
        reason: String,
    },
}

/// Owner of the single emission. Dropping it stops emission.
pub struct BroadcastController {
    session: BroadcastSession,
    last_error: Option<BroadcastError>,
    /// Bumped for every Start or Stop; notices from older ones are stale.
    generation: u64,
    commands: Option<mpsc::UnboundedSender<EmitterCommand>>,
    notifications: Option<mpsc::UnboundedReceiver<EmitterNotification>>,
}

impl BroadcastController {
    /// Start the controller. With an emitter, a worker is spawned on the
    /// blocking pool and probes the hardware; this requires a Tokio runtime.
    /// Without one the controller is permanently [`BroadcastState::Unsupported`].
    pub fn spawn(emitter: Option<Arc<dyn HardwareEmitter>>) -> Self {
        let mut controller = Self {
            session: BroadcastSession {
                current_url: None,
                user_enabled: false,
                hardware_available: HardwareAvailability::Unknown,
                emitting: false,
            },
            last_error: None,
            generation: 0,
            commands: None,
            notifications: None,
        };

        match emitter {
            Some(emitter) => {
                let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
                let (notif_tx, notif_rx) = mpsc::unbounded_channel();
                tokio::task::spawn_blocking(move || run_worker(emitter, cmd_rx, notif_tx));
                controller.commands = Some(cmd_tx);
                controller.notifications = Some(notif_rx);
            }
            None => {
                info!("no broadcast hardware configured");
                controller.mark_absent();
            }
        }
        controller
    }

    fn mark_absent(&mut self) {
        self.session.hardware_available = HardwareAvailability::Absent;
        self.session.emitting = false;
        self.last_error = Some(BroadcastError::HardwareUnavailable);
        self.commands = None;
    }

    pub fn state(&self) -> BroadcastState {
        match self.session.hardware_available {
            HardwareAvailability::Unknown | HardwareAvailability::Absent => {
                BroadcastState::Unsupported
            }
            HardwareAvailability::Present if !self.session.user_enabled => BroadcastState::Idle,
            HardwareAvailability::Present if self.session.emitting => BroadcastState::Emitting,
            HardwareAvailability::Present => BroadcastState::Armed,
        }
    }

    pub fn session(&self) -> &BroadcastSession {
        &self.session
    }

    /// Most recent non-fatal problem, if any.
    pub fn last_error(&self) -> Option<&BroadcastError> {
        self.last_error.as_ref()
    }

    /// Record the user's toggle.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.poll_events();
        if self.session.user_enabled == enabled {
            return;
        }
        self.session.user_enabled = enabled;
        debug!(enabled, "broadcast toggled");

        if enabled {
            self.start_if_ready();
        } else {
            self.stop();
        }
    }

    /// Set or clear the link of the card currently showing its code.
    /// Setting the same link again retries a start that failed.
    pub fn set_active_link(&mut self, url: Option<String>) {
        self.poll_events();
        if self.session.current_url == url && (url.is_none() || self.session.emitting) {
            return;
        }
        self.session.current_url = url;

        if self.session.current_url.is_some() {
            self.start_if_ready();
        } else {
            self.stop();
        }
    }

    fn start_if_ready(&mut self) {
        if self.session.hardware_available != HardwareAvailability::Present
            || !self.session.user_enabled
        {
            return;
        }
        if let Some(url) = self.session.current_url.clone() {
            self.session.emitting = true;
            self.generation += 1;
            let generation = self.generation;
            self.send(EmitterCommand::Start { generation, url });
        }
    }

    /// Queued even when nothing is believed to be emitting. The worker
    /// ignores a Stop with no active emission.
    fn stop(&mut self) {
        self.session.emitting = false;
        self.generation += 1;
        let generation = self.generation;
        self.send(EmitterCommand::Stop { generation });
    }

    fn send(&mut self, command: EmitterCommand) {
        let Some(tx) = &self.commands else {
            return;
        };
        if tx.send(command).is_err() {
            warn!("emitter worker is gone");
            self.session.emitting = false;
            self.last_error = Some(BroadcastError::EmissionFailed("emitter stopped".into()));
            self.commands = None;
        }
    }

    /// Apply every notification the worker has posted so far. Returns how
    /// many were applied.
    pub fn poll_events(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(rx) = self.notifications.as_mut() {
            while let Ok(notification) = rx.try_recv() {
                pending.push(notification);
            }
        }
        let count = pending.len();
        for notification in pending {
            self.apply(notification);
        }
        count
    }

    fn apply(&mut self, notification: EmitterNotification) {
        match notification {
            EmitterNotification::Probed { available: true } => {
                info!("broadcast hardware present");
                self.session.hardware_available = HardwareAvailability::Present;
                self.start_if_ready();
            }
            EmitterNotification::Probed { available: false } => {
                info!("broadcast hardware absent");
                self.mark_absent();
            }
            EmitterNotification::Started { generation, url } => {
                debug!(%url, generation, "emission started");
                if generation == self.generation {
                    self.session.emitting = true;
                    self.last_error = None;
                }
            }
            EmitterNotification::Stopped => {
                debug!("emission stopped");
            }
            EmitterNotification::Failed {
                generation,
                url,
                reason,
            } => {
                warn!(url = ?url, generation, %reason, "broadcast hardware call failed");
                if generation != self.generation {
                    return;
                }
                if url.is_some() {
                    self.session.emitting = false;
                }
                self.last_error = Some(BroadcastError::EmissionFailed(reason));
            }
        }
    }

    /// Wait until the worker has handled everything queued so far and apply
    /// its notifications.
    pub async fn settle(&mut self) {
        loop {
            if let Some(tx) = &self.commands {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(EmitterCommand::Barrier(done_tx)).is_ok() {
                    let _ = done_rx.await;
                }
            }
            if self.poll_events() == 0 {
                break;
            }
        }
    }
}

impl Drop for BroadcastController {
    fn drop(&mut self) {
        if let Some(tx) = self.commands.take() {
            let _ = tx.send(EmitterCommand::Shutdown);
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct Worker {
    emitter: Arc<dyn HardwareEmitter>,
    session: Option<Box<dyn EmissionSession>>,
    active: Option<String>,
    notify: mpsc::UnboundedSender<EmitterNotification>,
}

fn run_worker(
    emitter: Arc<dyn HardwareEmitter>,
    mut commands: mpsc::UnboundedReceiver<EmitterCommand>,
    notify: mpsc::UnboundedSender<EmitterNotification>,
) {
    let available = emitter.probe_available();
    let _ = notify.send(EmitterNotification::Probed { available });
    if !available {
        return;
    }

    let mut worker = Worker {
        emitter,
        session: None,
        active: None,
        notify,
    };

    while let Some(command) = commands.blocking_recv() {
        match command {
            EmitterCommand::Start { generation, url } => worker.start(generation, url),
            EmitterCommand::Stop { generation } => worker.stop(generation),
            EmitterCommand::Barrier(done) => {
                let _ = done.send(());
            }
            EmitterCommand::Shutdown => break,
        }
    }

    worker.stop(0);
    debug!("emitter worker exiting");
}

impl Worker {
    fn start(&mut self, generation: u64, url: String) {
        // Never two emissions at once.
        self.stop(generation);

        let result = self.open_session().and_then(|session| {
            session.set_payload(&url)?;
            session.set_enabled(true)
        });
        match result {
            Ok(()) => {
                self.active = Some(url.clone());
                let _ = self
                    .notify
                    .send(EmitterNotification::Started { generation, url });
            }
            Err(e) => {
                let _ = self.notify.send(EmitterNotification::Failed {
                    generation,
                    url: Some(url),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn stop(&mut self, generation: u64) {
        if self.active.take().is_none() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.set_enabled(false) {
            Ok(()) => {
                let _ = self.notify.send(EmitterNotification::Stopped);
            }
            Err(e) => {
                let _ = self.notify.send(EmitterNotification::Failed {
                    generation,
                    url: None,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// The one session for this run, created on first use.
    fn open_session(&mut self) -> Result<&mut Box<dyn EmissionSession>, EmitterError> {
        if self.session.is_none() {
            self.session = Some(self.emitter.create_session()?);
        }
        self.session
            .as_mut()
            .ok_or_else(|| EmitterError::new("session unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::soft::SoftEmitter;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        CreateSession,
        Payload(String),
        Enabled(bool),
    }

    /// Emitter that records every hardware call. The first `payload_failures`
    /// payload installs fail.
    #[derive(Clone, Default)]
    struct RecordingEmitter {
        calls: Arc<Mutex<Vec<Call>>>,
        absent: bool,
        payload_failures: Arc<Mutex<usize>>,
    }

    impl RecordingEmitter {
        fn failing(times: usize) -> Self {
            Self {
                payload_failures: Arc::new(Mutex::new(times)),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, call: &Call) -> usize {
            self.calls().iter().filter(|c| *c == call).count()
        }
    }

    struct RecordingSession(RecordingEmitter);

    impl HardwareEmitter for RecordingEmitter {
        fn probe_available(&self) -> bool {
            !self.absent
        }

        fn create_session(&self) -> Result<Box<dyn EmissionSession>, EmitterError> {
            self.calls.lock().unwrap().push(Call::CreateSession);
            Ok(Box::new(RecordingSession(self.clone())))
        }
    }

    impl EmissionSession for RecordingSession {
        fn set_payload(&mut self, url: &str) -> Result<(), EmitterError> {
            let mut failures = self.0.payload_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(EmitterError::new("radio busy"));
            }
            drop(failures);
            self.0.calls.lock().unwrap().push(Call::Payload(url.to_string()));
            Ok(())
        }

        fn set_enabled(&mut self, enabled: bool) -> Result<(), EmitterError> {
            self.0.calls.lock().unwrap().push(Call::Enabled(enabled));
            Ok(())
        }
    }

    async fn ready(emitter: &RecordingEmitter) -> BroadcastController {
        let mut controller = BroadcastController::spawn(Some(Arc::new(emitter.clone())));
        controller.settle().await;
        controller
    }

    #[tokio::test]
    async fn no_emitter_is_unsupported() {
        let mut controller = BroadcastController::spawn(None);
        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Unsupported);
        assert_eq!(controller.last_error(), Some(&BroadcastError::HardwareUnavailable));
        assert!(!controller.session().emitting);
    }

    #[tokio::test]
    async fn probe_absent_is_terminal() {
        let emitter = RecordingEmitter {
            absent: true,
            ..Default::default()
        };
        let mut controller = ready(&emitter).await;
        assert_eq!(controller.state(), BroadcastState::Unsupported);
        assert_eq!(controller.session().hardware_available, HardwareAvailability::Absent);

        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Unsupported);
        assert!(emitter.calls().is_empty());
    }

    #[tokio::test]
    async fn probe_present_is_idle() {
        let emitter = RecordingEmitter::default();
        let controller = ready(&emitter).await;
        assert_eq!(controller.state(), BroadcastState::Idle);
        assert!(emitter.calls().is_empty());
    }

    #[tokio::test]
    async fn enable_then_link_then_clear_stops_once() {
        let emitter = RecordingEmitter::default();
        let mut controller = ready(&emitter).await;

        controller.set_enabled(true);
        assert_eq!(controller.state(), BroadcastState::Armed);

        controller.set_active_link(Some("https://t.me/alice".into()));
        assert_eq!(controller.state(), BroadcastState::Emitting);
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Emitting);

        controller.set_active_link(None);
        assert_eq!(controller.state(), BroadcastState::Armed);
        controller.settle().await;
        controller.set_active_link(None);
        controller.settle().await;

        assert_eq!(
            emitter.calls(),
            vec![
                Call::CreateSession,
                Call::Payload("https://t.me/alice".into()),
                Call::Enabled(true),
                Call::Enabled(false),
            ]
        );
    }

    #[tokio::test]
    async fn switching_links_stops_previous_first() {
        let emitter = RecordingEmitter::default();
        let mut controller = ready(&emitter).await;
        controller.set_active_link(Some("https://t.me/a".into()));
        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/b".into()));
        controller.settle().await;

        assert_eq!(controller.state(), BroadcastState::Emitting);
        assert_eq!(emitter.count(&Call::CreateSession), 1);
        assert_eq!(
            emitter.calls()[1..],
            [
                Call::Payload("https://t.me/a".into()),
                Call::Enabled(true),
                Call::Enabled(false),
                Call::Payload("https://t.me/b".into()),
                Call::Enabled(true),
            ]
        );
    }

    #[tokio::test]
    async fn disable_returns_to_idle() {
        let emitter = RecordingEmitter::default();
        let mut controller = ready(&emitter).await;
        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.set_enabled(false);
        controller.settle().await;

        assert_eq!(controller.state(), BroadcastState::Idle);
        assert_eq!(emitter.count(&Call::Enabled(false)), 1);
        // The link is kept; enabling again resumes emission.
        controller.set_enabled(true);
        assert_eq!(controller.state(), BroadcastState::Emitting);
    }

    #[tokio::test]
    async fn intent_before_probe_is_applied() {
        let emitter = RecordingEmitter::default();
        let mut controller = BroadcastController::spawn(Some(Arc::new(emitter.clone())));
        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Emitting);
        assert_eq!(emitter.count(&Call::Enabled(true)), 1);
    }

    #[tokio::test]
    async fn hardware_failure_falls_back_to_armed() {
        let emitter = RecordingEmitter::failing(usize::MAX);
        let mut controller = ready(&emitter).await;
        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.settle().await;

        assert_eq!(controller.state(), BroadcastState::Armed);
        assert!(matches!(
            controller.last_error(),
            Some(BroadcastError::EmissionFailed(reason)) if reason == "radio busy"
        ));
        // Nothing was started, so nothing is stopped.
        controller.set_active_link(None);
        controller.settle().await;
        assert_eq!(emitter.count(&Call::Enabled(false)), 0);
    }

    #[tokio::test]
    async fn late_failure_does_not_hide_newer_emission() {
        let emitter = RecordingEmitter::failing(1);
        let mut controller = ready(&emitter).await;
        let link = "https://t.me/alice".to_string();

        controller.set_enabled(true);
        controller.set_active_link(Some(link.clone()));
        controller.set_active_link(None);
        controller.set_active_link(Some(link.clone()));
        controller.settle().await;

        assert_eq!(controller.state(), BroadcastState::Emitting);
        assert!(controller.session().emitting);
        assert_eq!(emitter.count(&Call::Enabled(true)), 1);

        controller.set_enabled(false);
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Idle);
        assert_eq!(emitter.calls().last(), Some(&Call::Enabled(false)));
    }

    #[tokio::test]
    async fn same_link_retries_after_failure() {
        let emitter = RecordingEmitter::failing(1);
        let mut controller = ready(&emitter).await;
        let link = "https://t.me/alice".to_string();

        controller.set_enabled(true);
        controller.set_active_link(Some(link.clone()));
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Armed);

        controller.set_active_link(Some(link.clone()));
        controller.settle().await;
        assert_eq!(controller.state(), BroadcastState::Emitting);
        assert_eq!(controller.last_error(), None);
        assert_eq!(
            emitter.calls(),
            vec![Call::CreateSession, Call::Payload(link), Call::Enabled(true)]
        );
    }

    #[tokio::test]
    async fn start_overtaken_by_stop_stays_armed() {
        let emitter = RecordingEmitter::default();
        let mut controller = ready(&emitter).await;

        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.set_active_link(None);
        controller.settle().await;

        assert_eq!(controller.state(), BroadcastState::Armed);
        assert!(!controller.session().emitting);
        assert_eq!(emitter.calls().last(), Some(&Call::Enabled(false)));
    }

    #[tokio::test]
    async fn drop_stops_emission() {
        let emitter = SoftEmitter::new();
        let mut controller = BroadcastController::spawn(Some(Arc::new(emitter.clone())));
        controller.set_enabled(true);
        controller.set_active_link(Some("https://t.me/alice".into()));
        controller.settle().await;
        assert_eq!(emitter.emitted_url().as_deref(), Some("https://t.me/alice"));

        drop(controller);
        for _ in 0..100 {
            if emitter.emitted_url().is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(emitter.emitted_url(), None);
        assert_eq!(emitter.call_counts(), (1, 1, 1));
    }
}
