//! Playback scheduler: drives one session of timed events to completion.
//!
//! A public handle owns command/event channels to a worker on a dedicated
//! thread. The worker consumes events strictly in sequence, one in flight
//! at a time, with exactly two suspension points: waiting for a tone's
//! natural end and waiting out a silence. A stop command is observed at the
//! next suspension check and no further event begins after it.

use crate::tone::{ToneEngine, ToneSource};
use crossbeam_channel::{select, unbounded, Receiver, RecvTimeoutError, Sender};
use keyer_core::{Error, PlaybackEvent, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Status of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session; ready to start.
    #[default]
    Idle,
    /// A session is consuming events.
    Running,
    /// The last session was cancelled before its final event.
    Stopped,
}

/// Events emitted by the scheduler. The terminal events distinguish natural
/// completion from cancellation so callers can re-enable their controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session began consuming events.
    Started,
    /// The session consumed its last event.
    Finished,
    /// The session was cancelled by a stop request.
    Stopped,
    /// The session aborted; the message describes the audio failure.
    Error(String),
}

enum SchedulerCommand {
    Start(Vec<PlaybackEvent>),
    Stop,
    Shutdown,
}

/// Handle to the playback worker. At most one session runs at a time; a
/// `start` while a session is in flight fails with
/// [`Error::AlreadyRunning`] and leaves that session untouched.
pub struct PlaybackScheduler {
    status: Arc<RwLock<SessionStatus>>,
    command_tx: Sender<SchedulerCommand>,
    event_rx: Receiver<SessionEvent>,
}

impl PlaybackScheduler {
    /// Create a scheduler backed by the cpal tone engine.
    pub fn new() -> Result<Self> {
        Self::with_tone_source(ToneEngine::new)
    }

    /// Create a scheduler with a custom tone source. The factory runs on
    /// the worker thread because the real engine's stream is not `Send`.
    pub fn with_tone_source<T, F>(factory: F) -> Result<Self>
    where
        T: ToneSource + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let status = Arc::new(RwLock::new(SessionStatus::Idle));

        let worker_status = status.clone();
        std::thread::Builder::new()
            .name("keyer-playback".to_string())
            .spawn(move || {
                let worker = SchedulerWorker {
                    command_rx,
                    event_tx,
                    status: worker_status,
                    tone: factory(),
                };
                worker.run();
            })
            .map_err(|e| Error::AudioOutput(format!("failed to spawn playback thread: {e}")))?;

        Ok(Self {
            status,
            command_tx,
            event_rx,
        })
    }

    /// Start a new session at cursor 0.
    ///
    /// The status write lock is claimed before enqueueing, so concurrent
    /// `start` calls cannot both win.
    pub fn start(&self, events: Vec<PlaybackEvent>) -> Result<()> {
        {
            let mut status = self.status.write();
            if *status == SessionStatus::Running {
                return Err(Error::AlreadyRunning);
            }
            *status = SessionStatus::Running;
        }

        self.command_tx
            .send(SchedulerCommand::Start(events))
            .map_err(|_| {
                *self.status.write() = SessionStatus::Idle;
                Error::ChannelClosed
            })
    }

    /// Cancel the running session. A no-op when nothing is running.
    pub fn stop(&self) -> Result<()> {
        if *self.status.read() != SessionStatus::Running {
            return Ok(());
        }
        self.command_tx
            .send(SchedulerCommand::Stop)
            .map_err(|_| Error::ChannelClosed)
    }

    /// Get the current session status.
    pub fn status(&self) -> SessionStatus {
        *self.status.read()
    }

    /// Try to receive an event without blocking.
    pub fn try_recv_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive events, blocking until one is available.
    pub fn recv_event(&self) -> Option<SessionEvent> {
        self.event_rx.recv().ok()
    }

    /// Receive events, giving up after `timeout`.
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<SessionEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Shut down the worker thread.
    pub fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(SchedulerCommand::Shutdown)
            .map_err(|_| Error::ChannelClosed)
    }
}

/// Mutable state of one playback run.
struct PlaybackSession {
    events: Vec<PlaybackEvent>,
    cursor: usize,
}

impl PlaybackSession {
    const fn new(events: Vec<PlaybackEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    fn current(&self) -> Option<PlaybackEvent> {
        self.events.get(self.cursor).copied()
    }

    fn advance(&mut self) {
        // Cursor stays within [0, events.len()].
        self.cursor = (self.cursor + 1).min(self.events.len());
    }

    const fn len(&self) -> usize {
        self.events.len()
    }
}

enum StepOutcome {
    Completed,
    Stopped,
    Failed(String),
    Shutdown,
}

struct SchedulerWorker<T: ToneSource> {
    command_rx: Receiver<SchedulerCommand>,
    event_tx: Sender<SessionEvent>,
    status: Arc<RwLock<SessionStatus>>,
    tone: T,
}

impl<T: ToneSource> SchedulerWorker<T> {
    fn run(mut self) {
        info!("Playback worker started");

        loop {
            match self.command_rx.recv() {
                Ok(SchedulerCommand::Start(events)) => {
                    if !self.run_session(events) {
                        break;
                    }
                }
                // Stale stop: the session it targeted already reached a
                // terminal state.
                Ok(SchedulerCommand::Stop) => {}
                Ok(SchedulerCommand::Shutdown) | Err(_) => break,
            }
        }

        info!("Playback worker shutting down");
    }

    /// Drive one session to a terminal state. Returns false when a shutdown
    /// was requested mid-session.
    fn run_session(&mut self, events: Vec<PlaybackEvent>) -> bool {
        let mut session = PlaybackSession::new(events);
        debug!("Session started: {} events", session.len());
        let _ = self.event_tx.send(SessionEvent::Started);

        while let Some(event) = session.current() {
            let outcome = match event {
                PlaybackEvent::Tone {
                    duration_secs,
                    frequency_hz,
                } => self.play_tone(frequency_hz, duration_secs),
                PlaybackEvent::Silence { duration_secs } => self.wait_silence(duration_secs),
            };

            match outcome {
                StepOutcome::Completed => session.advance(),
                StepOutcome::Stopped => {
                    debug!("Session stopped at event {}", session.cursor);
                    self.set_status(SessionStatus::Stopped);
                    let _ = self.event_tx.send(SessionEvent::Stopped);
                    return true;
                }
                StepOutcome::Failed(message) => {
                    warn!("Session aborted: {message}");
                    self.set_status(SessionStatus::Idle);
                    let _ = self.event_tx.send(SessionEvent::Error(message));
                    return true;
                }
                StepOutcome::Shutdown => {
                    self.set_status(SessionStatus::Stopped);
                    let _ = self.event_tx.send(SessionEvent::Stopped);
                    return false;
                }
            }
        }

        debug!("Session finished");
        self.set_status(SessionStatus::Idle);
        let _ = self.event_tx.send(SessionEvent::Finished);
        true
    }

    /// Sound a tone and suspend until it ends naturally or a stop wins the
    /// race.
    fn play_tone(&mut self, frequency_hz: f64, duration_secs: f64) -> StepOutcome {
        let done_rx = match self.tone.sound(frequency_hz, duration_secs) {
            Ok(rx) => rx,
            Err(e) => return StepOutcome::Failed(e.to_string()),
        };

        loop {
            select! {
                recv(done_rx) -> result => {
                    // A dropped voice without a signal still means the tone
                    // is over.
                    let _ = result;
                    return StepOutcome::Completed;
                }
                recv(self.command_rx) -> command => match command {
                    Ok(SchedulerCommand::Stop) => {
                        self.tone.force_stop();
                        return StepOutcome::Stopped;
                    }
                    Ok(SchedulerCommand::Shutdown) | Err(_) => {
                        self.tone.force_stop();
                        return StepOutcome::Shutdown;
                    }
                    Ok(SchedulerCommand::Start(_)) => {
                        warn!("Start ignored: a session is already running");
                    }
                },
            }
        }
    }

    /// Suspend for a silence via the command channel as a cancelable timer.
    fn wait_silence(&self, duration_secs: f64) -> StepOutcome {
        let deadline = Instant::now() + Duration::from_secs_f64(duration_secs);

        loop {
            match self.command_rx.recv_deadline(deadline) {
                Ok(SchedulerCommand::Stop) => return StepOutcome::Stopped,
                Ok(SchedulerCommand::Shutdown) => return StepOutcome::Shutdown,
                Ok(SchedulerCommand::Start(_)) => {
                    warn!("Start ignored: a session is already running");
                }
                Err(RecvTimeoutError::Timeout) => return StepOutcome::Completed,
                Err(RecvTimeoutError::Disconnected) => return StepOutcome::Shutdown,
            }
        }
    }

    fn set_status(&self, new_status: SessionStatus) {
        let old_status = {
            let mut status = self.status.write();
            let old = *status;
            *status = new_status;
            old
        };

        if old_status != new_status {
            debug!("Status changed: {old_status:?} -> {new_status:?}");
        }
    }
}
