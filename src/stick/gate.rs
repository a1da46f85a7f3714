//! Emission policy: when does a new command reach the listener?
//!
//! Two strategies are supported:
//!
//! - **Threshold**: synchronous, driven by move events. A command is emitted
//!   when angle or power moved by more than the change threshold since the
//!   last emission, or when the minimum interval has elapsed.
//! - **Continuous**: a fixed-rate tick re-emits the current command for as
//!   long as the contact is held, whether or not it moves. Move events never
//!   emit on their own.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use super::command::PolarCommand;
use crate::config::StickConfig;

/// Emission strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    #[default]
    Threshold,
    Continuous,
}

impl std::str::FromStr for EmissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "threshold" => Ok(EmissionMode::Threshold),
            "continuous" => Ok(EmissionMode::Continuous),
            other => Err(format!("unknown emission mode: {}", other)),
        }
    }
}

/// What was last delivered to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionState {
    pub last_angle: u16,
    pub last_power: u8,
    pub last_emit_at: Instant,
}

/// Rate limiter between computed commands and the listener
#[derive(Debug, Clone)]
pub struct UpdateGate {
    mode: EmissionMode,
    change_threshold: u16,
    min_interval: Duration,
    loop_interval: Duration,
    state: Option<EmissionState>,
}

impl UpdateGate {
    pub fn new(
        mode: EmissionMode,
        change_threshold: u16,
        min_interval: Duration,
        loop_interval: Duration,
    ) -> Self {
        Self {
            mode,
            change_threshold,
            min_interval,
            loop_interval,
            state: None,
        }
    }

    pub fn from_config(config: &StickConfig) -> Self {
        Self::new(
            config.emission_mode,
            config.change_threshold,
            Duration::from_millis(config.min_interval_ms),
            Duration::from_millis(config.loop_interval_ms),
        )
    }

    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    /// Tick period used by continuous mode
    pub fn loop_interval(&self) -> Duration {
        self.loop_interval
    }

    pub fn state(&self) -> Option<EmissionState> {
        self.state
    }

    /// Record an unconditional emission (press, continuous tick)
    pub fn record(&mut self, command: &PolarCommand, now: Instant) {
        self.state = Some(EmissionState {
            last_angle: command.angle,
            last_power: command.power,
            last_emit_at: now,
        });
    }

    /// Threshold decision for a move event
    ///
    /// Returns true and records the emission if the command should be sent.
    /// Always false in continuous mode. With no prior emission (unseeded
    /// gate) the command is always let through.
    pub fn should_emit(&mut self, command: &PolarCommand, now: Instant) -> bool {
        if self.mode == EmissionMode::Continuous {
            return false;
        }

        let emit = match self.state {
            None => true,
            Some(last) => {
                let threshold = self.change_threshold as i32;
                let angle_delta = (command.angle as i32 - last.last_angle as i32).abs();
                let power_delta = (command.power as i32 - last.last_power as i32).abs();
                let elapsed = now.saturating_duration_since(last.last_emit_at);

                angle_delta > threshold || power_delta > threshold || elapsed >= self.min_interval
            }
        };

        if emit {
            self.record(command, now);
        }
        emit
    }

    /// Forget the last emission (end of session)
    pub fn clear(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stick::direction::direction_of;

    fn cmd(angle: u16, power: u8) -> PolarCommand {
        PolarCommand {
            angle,
            power,
            direction: direction_of(angle, power),
        }
    }

    fn threshold_gate() -> UpdateGate {
        UpdateGate::new(
            EmissionMode::Threshold,
            5,
            Duration::from_millis(50),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_small_change_within_interval_is_suppressed() {
        let mut gate = threshold_gate();
        let t0 = Instant::now();
        gate.record(&cmd(90, 50), t0);

        assert!(!gate.should_emit(&cmd(93, 52), t0 + Duration::from_millis(10)));
        assert!(!gate.should_emit(&cmd(95, 55), t0 + Duration::from_millis(20)));
        // Suppressed moves do not move the reference point
        assert_eq!(gate.state().unwrap().last_angle, 90);
    }

    #[test]
    fn test_angle_change_above_threshold_emits() {
        let mut gate = threshold_gate();
        let t0 = Instant::now();
        gate.record(&cmd(90, 50), t0);

        let t1 = t0 + Duration::from_millis(5);
        assert!(gate.should_emit(&cmd(96, 50), t1));
        let state = gate.state().unwrap();
        assert_eq!(state.last_angle, 96);
        assert_eq!(state.last_emit_at, t1);
    }

    #[test]
    fn test_power_change_above_threshold_emits() {
        let mut gate = threshold_gate();
        let t0 = Instant::now();
        gate.record(&cmd(90, 50), t0);

        assert!(gate.should_emit(&cmd(90, 44), t0 + Duration::from_millis(5)));
    }

    #[test]
    fn test_elapsed_interval_emits_without_change() {
        let mut gate = threshold_gate();
        let t0 = Instant::now();
        gate.record(&cmd(90, 50), t0);

        assert!(!gate.should_emit(&cmd(90, 50), t0 + Duration::from_millis(49)));
        assert!(gate.should_emit(&cmd(90, 50), t0 + Duration::from_millis(50)));
    }

    #[test]
    fn test_unseeded_gate_emits() {
        let mut gate = threshold_gate();
        assert!(gate.should_emit(&cmd(0, 10), Instant::now()));
    }

    #[test]
    fn test_continuous_mode_never_emits_on_move() {
        let mut gate = UpdateGate::new(
            EmissionMode::Continuous,
            5,
            Duration::from_millis(50),
            Duration::from_millis(100),
        );
        let t0 = Instant::now();
        gate.record(&cmd(0, 10), t0);
        assert!(!gate.should_emit(&cmd(180, 100), t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_clear_forgets_state() {
        let mut gate = threshold_gate();
        gate.record(&cmd(90, 50), Instant::now());
        gate.clear();
        assert!(gate.state().is_none());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("threshold".parse::<EmissionMode>(), Ok(EmissionMode::Threshold));
        assert_eq!("Continuous".parse::<EmissionMode>(), Ok(EmissionMode::Continuous));
        assert!("polling".parse::<EmissionMode>().is_err());
    }
}
