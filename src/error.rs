//! Error types for the joystick engine

use thiserror::Error;

/// Errors reported by the joystick engine
///
/// Geometry and scheduling never fail; these cover registration,
/// configuration and runtime lifecycle problems.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StickError {
    /// A value listener is already installed on this controller
    #[error("a value listener is already registered; unregister it first")]
    ListenerAlreadyRegistered,

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The runtime task has stopped and no longer accepts commands
    #[error("joystick runtime is closed")]
    RuntimeClosed,
}

pub type StickResult<T> = Result<T, StickError>;
