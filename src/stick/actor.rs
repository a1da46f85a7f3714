//! StickActor - sequential runtime for one joystick control
//!
//! All pointer events, resizes and continuous-mode ticks are processed on a
//! single tokio task, so the controller state is never shared across
//! threads. The tick interval lives inside the actor loop:
//!
//! ```text
//!  StickHandle ──commands──► ┌──────────────── StickActor ───────────────┐
//!                            │ select! {                                  │
//!                            │   cmd  = command_rx.recv() => handle(cmd)  │
//!                            │   gen  = ticker.tick()     => tick(gen)    │
//!                            │ }                                          │
//!                            │ reconcile ticker with tick_schedule()      │
//!                            └────────────────────────────────────────────┘
//! ```
//!
//! After every command the actor compares its ticker with the controller's
//! [`TickSchedule`](super::controller::TickSchedule). A new generation
//! replaces the interval, no schedule drops it. At most one ticker exists at
//! any time and a dropped ticker can never fire again.

use std::future::pending;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::command::PolarCommand;
use super::controller::{JoystickController, SessionState, TickSchedule};
use super::listener::{ListenerSlot, ValueListener};
use super::tracker::PadSnapshot;
use crate::config::StickConfig;
use crate::error::{StickError, StickResult};

/// Phase of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Press,
    Move,
    Release,
}

/// A pointer event in the control's local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn press(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Press, x, y }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Move, x, y }
    }

    pub fn release() -> Self {
        Self { phase: PointerPhase::Release, x: 0.0, y: 0.0 }
    }
}

/// Commands accepted by the actor
#[derive(Debug)]
pub enum StickCommand {
    Pointer(PointerEvent),
    Resize { width: f32, height: f32 },
    /// Query the session state (mostly for tests and diagnostics)
    GetSession { response: oneshot::Sender<SessionState> },
    Shutdown,
}

/// Tick loop bound to one session generation
struct Ticker {
    generation: u64,
    interval: Interval,
}

impl Ticker {
    fn start(schedule: TickSchedule) -> Self {
        // First tick one period after the press; the press itself already emitted
        let mut interval = interval_at(Instant::now() + schedule.period, schedule.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            generation: schedule.generation,
            interval,
        }
    }
}

/// Wait for the next tick of the active ticker, or forever if there is none
async fn next_tick(ticker: &mut Option<Ticker>) -> u64 {
    match ticker {
        Some(t) => {
            t.interval.tick().await;
            t.generation
        }
        None => pending().await,
    }
}

/// Actor owning one [`JoystickController`]
pub struct StickActor {
    controller: JoystickController,
    command_rx: mpsc::UnboundedReceiver<StickCommand>,
    snapshot_tx: watch::Sender<PadSnapshot>,
    ticker: Option<Ticker>,
}

impl StickActor {
    /// Spawn the actor on the current tokio runtime
    ///
    /// Returns the handle and the task's join handle. The task ends on
    /// [`StickHandle::shutdown`] or when every handle is dropped.
    pub fn spawn(config: &StickConfig) -> StickResult<(StickHandle, JoinHandle<()>)> {
        config.validate()?;

        let (cmd_tx, command_rx) = mpsc::unbounded_channel();
        let listener = ListenerSlot::new();
        let controller = JoystickController::new(config, listener.clone());
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

        let actor = Self {
            controller,
            command_rx,
            snapshot_tx,
            ticker: None,
        };

        debug!(mode = ?config.emission_mode, "Spawning stick actor");
        let task = tokio::spawn(actor.run());

        Ok((
            StickHandle {
                cmd_tx,
                listener,
                snapshot_rx,
            },
            task,
        ))
    }

    async fn run(mut self) {
        debug!("Stick actor run loop started");

        loop {
            tokio::select! {
                // Commands first so a release always wins over a tick that
                // became ready in the same poll
                biased;

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(StickCommand::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd),
                    }
                }
                generation = next_tick(&mut self.ticker) => {
                    self.controller.tick(generation, Instant::now());
                }
            }

            self.reconcile_ticker();
            self.publish_redraw();
        }

        // Never leave a consumer with a held stick
        self.controller.release();
        self.ticker = None;
        self.controller.listener().unregister();
        debug!(emitted = self.controller.emitted(), "Stick actor stopped");
    }

    fn handle_command(&mut self, cmd: StickCommand) {
        trace!(?cmd, "Processing command");
        let now = Instant::now();

        match cmd {
            StickCommand::Pointer(event) => match event.phase {
                PointerPhase::Press => {
                    self.controller.press(event.x, event.y, now);
                }
                PointerPhase::Move => {
                    self.controller.move_to(event.x, event.y, now);
                }
                PointerPhase::Release => {
                    self.controller.release();
                }
            },
            StickCommand::Resize { width, height } => self.controller.resize(width, height),
            StickCommand::GetSession { response } => {
                let _ = response.send(self.controller.session());
            }
            StickCommand::Shutdown => {}
        }
    }

    /// Make the running ticker match the controller's schedule
    fn reconcile_ticker(&mut self) {
        let wanted = self.controller.tick_schedule();
        let running = self.ticker.as_ref().map(|t| t.generation);

        match (wanted, running) {
            (Some(schedule), Some(generation)) if schedule.generation == generation => {}
            (Some(schedule), _) => {
                if let Some(old) = running {
                    debug!(old, new = schedule.generation, "Replacing tick loop");
                } else {
                    debug!(generation = schedule.generation, period = ?schedule.period, "Starting tick loop");
                }
                self.ticker = Some(Ticker::start(schedule));
            }
            (None, Some(generation)) => {
                debug!(generation, "Stopping tick loop");
                self.ticker = None;
            }
            (None, None) => {}
        }
    }

    fn publish_redraw(&mut self) {
        if let Some(snapshot) = self.controller.take_redraw() {
            self.snapshot_tx.send_replace(snapshot);
        }
    }
}

/// Cloneable handle to a running [`StickActor`]
///
/// Pointer methods are fire-and-forget and never block the caller.
#[derive(Clone)]
pub struct StickHandle {
    cmd_tx: mpsc::UnboundedSender<StickCommand>,
    listener: ListenerSlot,
    snapshot_rx: watch::Receiver<PadSnapshot>,
}

impl StickHandle {
    /// Install the value listener (one per control)
    pub fn register_listener(&self, listener: ValueListener) -> StickResult<()> {
        self.listener.register(listener)
    }

    /// Convenience wrapper for plain closures
    pub fn on_value_changed<F>(&self, f: F) -> StickResult<()>
    where
        F: Fn(PolarCommand) + Send + Sync + 'static,
    {
        self.register_listener(std::sync::Arc::new(f))
    }

    /// Remove the value listener; returns whether one was installed
    pub fn unregister_listener(&self) -> bool {
        self.listener.unregister()
    }

    pub fn pointer(&self, event: PointerEvent) -> StickResult<()> {
        self.send(StickCommand::Pointer(event))
    }

    pub fn press(&self, x: f32, y: f32) -> StickResult<()> {
        self.pointer(PointerEvent::press(x, y))
    }

    pub fn move_to(&self, x: f32, y: f32) -> StickResult<()> {
        self.pointer(PointerEvent::moved(x, y))
    }

    pub fn release(&self) -> StickResult<()> {
        self.pointer(PointerEvent::release())
    }

    /// Report a new on-screen size for the control
    pub fn resize(&self, width: f32, height: f32) -> StickResult<()> {
        self.send(StickCommand::Resize { width, height })
    }

    /// Current session state, after all previously sent commands
    pub async fn session(&self) -> StickResult<SessionState> {
        let (response, rx) = oneshot::channel();
        self.send(StickCommand::GetSession { response })?;
        rx.await.map_err(|_| StickError::RuntimeClosed)
    }

    /// Receiver for redraw snapshots (rendering collaborator)
    pub fn subscribe_snapshots(&self) -> watch::Receiver<PadSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stop the actor; a held stick is released first
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(StickCommand::Shutdown);
    }

    fn send(&self, cmd: StickCommand) -> StickResult<()> {
        self.cmd_tx.send(cmd).map_err(|_| StickError::RuntimeClosed)
    }
}
