//! Eight-sector direction discretization
//!
//! One canonical mapping is used everywhere. Sectors are 45° wide and centred
//! on the compass points of the reference orientation in
//! [`geometry`](super::geometry) (0° = up, clockwise). Wire codes run clockwise
//! from `Front`, with `Center` reserved for zero power:
//!
//! | code | direction     | sector centre | angles      |
//! |------|---------------|---------------|-------------|
//! | 0    | `Center`      | -             | power == 0  |
//! | 1    | `Front`       | 0°            | 338..=22    |
//! | 2    | `FrontRight`  | 45°           | 23..=67     |
//! | 3    | `Right`       | 90°           | 68..=112    |
//! | 4    | `BottomRight` | 135°          | 113..=157   |
//! | 5    | `Bottom`      | 180°          | 158..=202   |
//! | 6    | `BottomLeft`  | 225°          | 203..=247   |
//! | 7    | `Left`        | 270°          | 248..=292   |
//! | 8    | `FrontLeft`   | 315°          | 293..=337   |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discretized stick direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Direction {
    #[default]
    Center = 0,
    Front = 1,
    FrontRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
    FrontLeft = 8,
}

impl Direction {
    /// The eight compass sectors in clockwise order starting at `Front`
    pub const SECTORS: [Direction; 8] = [
        Direction::Front,
        Direction::FrontRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::FrontLeft,
    ];

    /// Stable numeric code (see module table)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Direction::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::Center),
            1..=8 => Some(Self::SECTORS[(code - 1) as usize]),
            _ => None,
        }
    }

    /// Angle of the sector centre, `None` for `Center`
    pub fn center_angle(self) -> Option<u16> {
        match self {
            Direction::Center => None,
            other => Some((other.code() as u16 - 1) * 45),
        }
    }

    /// Short label for logs and terminal output
    pub fn label(self) -> &'static str {
        match self {
            Direction::Center => "center",
            Direction::Front => "front",
            Direction::FrontRight => "front-right",
            Direction::Right => "right",
            Direction::BottomRight => "bottom-right",
            Direction::Bottom => "bottom",
            Direction::BottomLeft => "bottom-left",
            Direction::Left => "left",
            Direction::FrontLeft => "front-left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket `angle` into a compass sector
///
/// Zero power is always `Center`. Otherwise the sector index is
/// `floor((angle + 22) / 45) mod 8`. Angles of 360 and above are reduced
/// modulo 360 first.
pub fn direction_of(angle: u16, power: u8) -> Direction {
    if power == 0 {
        return Direction::Center;
    }

    let sector = ((angle as u32 % 360 + 22) / 45) % 8;
    Direction::SECTORS[sector as usize]
}
