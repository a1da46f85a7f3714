//! Polar command emitted to the value listener

use serde::{Deserialize, Serialize};
use std::fmt;

use super::direction::{direction_of, Direction};
use super::geometry::{angle_of, power_of, Point};

/// Angle, power and direction derived from a contact point
///
/// Never mutated directly: always recomputed from the current contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PolarCommand {
    /// Degrees in `[0, 360)`, 0 = up, clockwise
    pub angle: u16,
    /// Displacement in percent of the pad radius, `[0, 100]`
    pub power: u8,
    pub direction: Direction,
}

impl PolarCommand {
    /// Resting command, sent on release
    pub const CENTER: PolarCommand = PolarCommand {
        angle: 0,
        power: 0,
        direction: Direction::Center,
    };

    /// Compute the command for a (clamped) contact point
    pub fn from_contact(contact: Point, center: Point, radius: f32) -> Self {
        let power = power_of(contact, center, radius);
        // A contact that rounds to zero power has no meaningful bearing
        let angle = if power == 0 { 0 } else { angle_of(contact, center) };

        Self {
            angle,
            power,
            direction: direction_of(angle, power),
        }
    }

    pub fn is_centered(&self) -> bool {
        self.power == 0
    }
}

impl fmt::Display for PolarCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "angle={:>3} power={:>3} dir={}", self.angle, self.power, self.direction)
    }
}
