//! Byte-axis output mapping
//!
//! Converts polar commands into a compact three-axis frame (X, Y, power) for
//! receivers that expect cartesian byte axes around a neutral centre value.
//!
//! Pipeline per command:
//! 1. deadzone: low power snaps to the neutral frame
//! 2. polar -> cartesian around `center` (X grows right, Y grows down)
//! 3. per-axis low-pass filter
//! 4. rate limit + change threshold, duplicate suppression
//!
//! Button state changes share the same output channel as [`ButtonFrame`]s.

use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::config::AxisConfig;
use crate::stick::PolarCommand;

/// Frame prefix for stick axis frames
pub const AXIS_FRAME_PREFIX: u8 = 0xF1;
/// Frame prefix for button frames
pub const BUTTON_FRAME_PREFIX: u8 = 0xF0;

const BUTTON_PRESSED: u8 = 0x7F;
const BUTTON_RELEASED: u8 = 0x00;

/// One output frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct AxisFrame {
    pub x: u8,
    pub y: u8,
    pub power: u8,
}

impl AxisFrame {
    /// Wire layout: `[0xF1, x, y, power]`
    pub fn encode(&self) -> [u8; 4] {
        [AXIS_FRAME_PREFIX, self.x, self.y, self.power]
    }

    /// Upper-case hex rendering of the encoded frame, space separated
    pub fn to_hex(&self) -> String {
        hex_frame(&self.encode())
    }
}

/// Face and shoulder buttons sent next to the stick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum GamepadButton {
    A = 0x01,
    B = 0x02,
    X = 0x03,
    Y = 0x04,
    Select = 0x05,
    Start = 0x06,
    L = 0x07,
    R = 0x08,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 8] = [
        GamepadButton::A,
        GamepadButton::B,
        GamepadButton::X,
        GamepadButton::Y,
        GamepadButton::Select,
        GamepadButton::Start,
        GamepadButton::L,
        GamepadButton::R,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.code() == code)
    }
}

/// Button press/release frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ButtonFrame {
    pub button: GamepadButton,
    pub pressed: bool,
}

impl ButtonFrame {
    pub fn new(button: GamepadButton, pressed: bool) -> Self {
        Self { button, pressed }
    }

    /// Wire layout: `[0xF0, code, 0x7F | 0x00]`
    pub fn encode(&self) -> [u8; 3] {
        let state = if self.pressed { BUTTON_PRESSED } else { BUTTON_RELEASED };
        [BUTTON_FRAME_PREFIX, self.button.code(), state]
    }

    /// Inverse of [`encode`](Self::encode); `None` for foreign or malformed frames
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [BUTTON_FRAME_PREFIX, code, state] => {
                let pressed = match state {
                    BUTTON_PRESSED => true,
                    BUTTON_RELEASED => false,
                    _ => return None,
                };
                GamepadButton::from_code(code).map(|button| Self { button, pressed })
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        hex_frame(&self.encode())
    }
}

fn hex_frame(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Exponential smoothing of one axis
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    alpha: f32,
    value: f32,
}

impl LowPassFilter {
    pub fn new(alpha: f32, initial: f32) -> Self {
        Self { alpha, value: initial }
    }

    pub fn filter(&mut self, sample: u8) -> u8 {
        self.value = self.alpha * sample as f32 + (1.0 - self.alpha) * self.value;
        self.value.round().clamp(0.0, 255.0) as u8
    }
}

/// Stateful command -> frame mapper
#[derive(Debug, Clone)]
pub struct AxisMapper {
    config: AxisConfig,
    x_filter: LowPassFilter,
    y_filter: LowPassFilter,
    last_frame: AxisFrame,
    last_sent_at: Option<Instant>,
}

impl AxisMapper {
    pub fn new(config: AxisConfig) -> Self {
        let center = config.center as f32;
        Self {
            x_filter: LowPassFilter::new(config.filter_alpha, center),
            y_filter: LowPassFilter::new(config.filter_alpha, center),
            last_frame: AxisFrame {
                x: config.center,
                y: config.center,
                power: 0,
            },
            last_sent_at: None,
            config,
        }
    }

    /// Neutral frame
    pub fn center_frame(&self) -> AxisFrame {
        AxisFrame {
            x: self.config.center,
            y: self.config.center,
            power: 0,
        }
    }

    /// Map a command; `Some(frame)` when a new frame should go out
    pub fn process(&mut self, command: &PolarCommand, now: Instant) -> Option<AxisFrame> {
        if command.power < self.config.deadzone_percent {
            return self.commit(self.center_frame(), now);
        }

        let (raw_x, raw_y) = self.raw_axes(command);
        let x = self.x_filter.filter(raw_x);
        let y = self.y_filter.filter(raw_y);

        if !self.should_send(x, y, now) {
            return None;
        }

        self.commit(AxisFrame { x, y, power: command.power }, now)
    }

    /// Unfiltered axis values for a command
    pub fn raw_axes(&self, command: &PolarCommand) -> (u8, u8) {
        let center = self.config.center as i32;
        let scaled = command.power as i32 * (center - 1) / 100;
        let radians = (command.angle as f64).to_radians();

        let dx = (radians.sin() * scaled as f64) as i32;
        let dy = (radians.cos() * scaled as f64) as i32;

        let x = (center + dx).clamp(0, 255) as u8;
        let y = (center - dy).clamp(0, 255) as u8;
        (x, y)
    }

    fn should_send(&self, x: u8, y: u8, now: Instant) -> bool {
        if let Some(last) = self.last_sent_at {
            let min_interval = Duration::from_millis(self.config.min_interval_ms);
            if now.saturating_duration_since(last) < min_interval {
                return false;
            }
        }

        let threshold = self.config.change_threshold as i32;
        (x as i32 - self.last_frame.x as i32).abs() > threshold
            || (y as i32 - self.last_frame.y as i32).abs() > threshold
    }

    fn commit(&mut self, frame: AxisFrame, now: Instant) -> Option<AxisFrame> {
        if frame == self.last_frame {
            return None;
        }
        trace!(?frame, "Axis frame");
        self.last_frame = frame;
        self.last_sent_at = Some(now);
        Some(frame)
    }
}
