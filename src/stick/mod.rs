//! Virtual joystick engine
//!
//! Pointer events flow through the pipeline below; every stage is a separate
//! module so it can be tested on its own.
//!
//! ```text
//! pointer event ─► PositionTracker (clamp) ─► geometry (angle/power)
//!               ─► direction (sector) ─► UpdateGate ─► value listener
//! ```
//!
//! [`JoystickController`] is the synchronous core. [`StickActor`] runs one
//! controller on a tokio task together with the continuous-mode tick loop.

pub mod actor;
pub mod command;
pub mod controller;
pub mod direction;
pub mod gate;
pub mod geometry;
pub mod listener;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use actor::{PointerEvent, PointerPhase, StickActor, StickHandle};
pub use command::PolarCommand;
pub use controller::{JoystickController, SessionState, TickSchedule};
pub use direction::{direction_of, Direction};
pub use gate::{EmissionMode, EmissionState, UpdateGate};
pub use geometry::{angle_of, clamp, power_of, Point};
pub use listener::{ListenerSlot, ValueListener};
pub use tracker::{Pad, PadSnapshot, PositionTracker};
