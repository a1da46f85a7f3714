//! Virtual Stick - on-screen joystick engine
//!
//! Tracks a single pointer contact inside a circular pad, turns it into polar
//! control values (angle, power, direction) and delivers them to one
//! registered listener, either rate-limited on movement or as a steady
//! stream while the stick is held.
//!
//! ```no_run
//! use virtual_stick::config::StickConfig;
//! use virtual_stick::stick::StickActor;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let (stick, _task) = StickActor::spawn(&StickConfig::default())?;
//! stick.on_value_changed(|cmd| println!("{}", cmd))?;
//! stick.resize(400.0, 400.0)?;
//! stick.press(200.0, 200.0)?;
//! stick.move_to(350.0, 200.0)?;
//! stick.release()?;
//! stick.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod axis;
pub mod config;
pub mod error;
pub mod stick;
pub mod trace;

pub use config::StickConfig;
pub use error::{StickError, StickResult};
pub use stick::{Direction, EmissionMode, PolarCommand, StickActor, StickHandle};
