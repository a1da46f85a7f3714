//! Joystick session state machine
//!
//! Ties the tracker, the geometry and the update gate together:
//!
//! ```text
//!            press                 release
//!   IDLE ───────────► ACTIVE ───────────────► IDLE
//!                     │  ▲
//!                     └──┘ move / tick / press (preempts)
//! ```
//!
//! The controller itself is synchronous and owns no timers. In continuous
//! mode it publishes a [`TickSchedule`] describing the one tick loop that
//! should be running; the runtime owns the actual interval and feeds ticks
//! back through [`JoystickController::tick`] with the generation they were
//! started for. Ticks from a superseded generation are ignored.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::command::PolarCommand;
use super::gate::{EmissionMode, UpdateGate};
use super::listener::ListenerSlot;
use super::tracker::{Pad, PadSnapshot, PositionTracker};
use crate::config::{LayoutConfig, StickConfig};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active { generation: u64 },
}

/// The tick loop the runtime should currently run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    pub generation: u64,
    pub period: Duration,
}

/// Pointer-to-command controller for a single on-screen stick
#[derive(Debug)]
pub struct JoystickController {
    tracker: PositionTracker,
    gate: UpdateGate,
    layout: LayoutConfig,
    session: SessionState,
    /// Last generation handed out; bumped on every press
    generation: u64,
    listener: ListenerSlot,
    emitted: u64,
}

impl JoystickController {
    /// Create a controller with an empty (zero-size) pad
    ///
    /// Call [`resize`](Self::resize) once the control has a size.
    pub fn new(config: &StickConfig, listener: ListenerSlot) -> Self {
        Self {
            tracker: PositionTracker::default(),
            gate: UpdateGate::from_config(config),
            layout: config.layout.clone(),
            session: SessionState::Idle,
            generation: 0,
            listener,
            emitted: 0,
        }
    }

    /// Derive the pad from the control's width and height
    pub fn resize(&mut self, width: f32, height: f32) {
        let pad = Pad::from_size(width, height, &self.layout);
        self.set_pad(pad);
    }

    /// Replace the pad; an active contact is re-clamped against it
    pub fn set_pad(&mut self, pad: Pad) {
        let active = self.is_active();
        self.tracker.set_pad(pad, active);
        debug!(
            "Pad set: center=({:.1}, {:.1}) radius={:.1} button={:.1}",
            pad.center.x, pad.center.y, pad.radius, pad.button_radius
        );
    }

    /// Start a new session at `(x, y)`
    ///
    /// Emits the initial command unconditionally. A press while a session is
    /// already active preempts it: the old tick loop is invalidated by the
    /// generation bump.
    pub fn press(&mut self, x: f32, y: f32, now: Instant) -> PolarCommand {
        if let SessionState::Active { generation } = self.session {
            debug!(generation, "Press while active, preempting session");
        }

        self.generation += 1;
        self.session = SessionState::Active {
            generation: self.generation,
        };
        self.gate.clear();

        self.tracker.set_raw_position(x, y);
        let command = self.current_command();
        self.gate.record(&command, now);
        self.emit(command);

        debug!(generation = self.generation, %command, "Session started");
        command
    }

    /// Update the contact; emits only when the threshold gate allows it
    ///
    /// No-op while idle. Returns the emitted command, if any.
    pub fn move_to(&mut self, x: f32, y: f32, now: Instant) -> Option<PolarCommand> {
        if !self.is_active() {
            trace!("Move ignored: no active session");
            return None;
        }

        self.tracker.set_raw_position(x, y);
        let command = self.current_command();

        if self.gate.should_emit(&command, now) {
            self.emit(command);
            Some(command)
        } else {
            None
        }
    }

    /// End the session: recentre and emit the terminal command
    ///
    /// No-op while idle.
    pub fn release(&mut self) -> Option<PolarCommand> {
        let SessionState::Active { generation } = self.session else {
            trace!("Release ignored: no active session");
            return None;
        };

        self.session = SessionState::Idle;
        self.tracker.reset();
        self.emit(PolarCommand::CENTER);
        self.gate.clear();

        debug!(generation, "Session ended");
        Some(PolarCommand::CENTER)
    }

    /// Continuous-mode tick for `generation`
    ///
    /// Emits the command for the current contact regardless of change, but
    /// only if the session that started this tick loop is still the active
    /// one. Returns whether it emitted.
    pub fn tick(&mut self, generation: u64, now: Instant) -> bool {
        if self.gate.mode() != EmissionMode::Continuous {
            return false;
        }

        match self.session {
            SessionState::Active { generation: active } if active == generation => {
                let command = self.current_command();
                self.gate.record(&command, now);
                trace!(generation, %command, "Tick");
                self.emit(command);
                true
            }
            _ => {
                trace!(generation, "Stale tick ignored");
                false
            }
        }
    }

    /// The tick loop that should be running right now, if any
    pub fn tick_schedule(&self) -> Option<TickSchedule> {
        match (self.gate.mode(), self.session) {
            (EmissionMode::Continuous, SessionState::Active { generation }) => Some(TickSchedule {
                generation,
                period: self.gate.loop_interval(),
            }),
            _ => None,
        }
    }

    /// Command for the current contact
    pub fn current_command(&self) -> PolarCommand {
        let pad = self.tracker.pad();
        PolarCommand::from_contact(self.tracker.contact(), pad.center, pad.radius)
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn is_active(&self) -> bool {
        matches!(self.session, SessionState::Active { .. })
    }

    pub fn mode(&self) -> EmissionMode {
        self.gate.mode()
    }

    pub fn listener(&self) -> &ListenerSlot {
        &self.listener
    }

    /// Number of commands delivered so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn snapshot(&self) -> PadSnapshot {
        self.tracker.snapshot()
    }

    /// Consume the redraw flag; `Some(snapshot)` if the pad needs redrawing
    pub fn take_redraw(&mut self) -> Option<PadSnapshot> {
        self.tracker.take_dirty().then(|| self.tracker.snapshot())
    }

    fn emit(&mut self, command: PolarCommand) {
        self.emitted += 1;
        trace!(%command, "Emit");
        self.listener.notify(command);
    }
}
