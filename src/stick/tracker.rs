//! Contact position tracking

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::geometry::{clamp, Point};
use crate::config::LayoutConfig;

/// Circular pad the contact point moves in
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pad {
    pub center: Point,
    /// Radius of the travel disk
    pub radius: f32,
    /// Radius of the draggable button (rendering only)
    pub button_radius: f32,
}

impl Pad {
    /// Derive a pad from the control's on-screen size
    ///
    /// The pad is centred in the control; both radii are fractions of half
    /// the smaller dimension.
    pub fn from_size(width: f32, height: f32, layout: &LayoutConfig) -> Self {
        let half = width.min(height).max(0.0) / 2.0;
        Self {
            center: Point::new(width / 2.0, height / 2.0),
            radius: half * layout.stick_ratio,
            button_radius: half * layout.button_ratio,
        }
    }
}

/// Read-only view handed to the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PadSnapshot {
    pub pad: Pad,
    pub contact: Point,
}

/// Owns the pad and the current clamped contact point
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    pad: Pad,
    contact: Point,
    dirty: bool,
}

impl PositionTracker {
    pub fn new(pad: Pad) -> Self {
        Self {
            pad,
            contact: pad.center,
            dirty: true,
        }
    }

    /// Replace the pad after a size/position change
    ///
    /// With `keep_contact` the existing contact is re-clamped against the new
    /// pad (an active session keeps its position); otherwise it is recentred.
    pub fn set_pad(&mut self, pad: Pad, keep_contact: bool) {
        self.pad = pad;
        self.contact = if keep_contact {
            clamp(self.contact, pad.center, pad.radius)
        } else {
            pad.center
        };
        self.dirty = true;
        trace!(?pad, contact = ?self.contact, "pad updated");
    }

    /// Clamp a raw pointer position into the pad and store it
    ///
    /// Non-finite coordinates are dropped and the previous contact is kept.
    pub fn set_raw_position(&mut self, x: f32, y: f32) -> Point {
        let raw = Point::new(x, y);
        if !raw.is_finite() {
            warn!(x, y, "Ignoring non-finite pointer position");
            return self.contact;
        }

        self.contact = clamp(raw, self.pad.center, self.pad.radius);
        self.dirty = true;
        self.contact
    }

    /// Move the contact back to the pad center
    pub fn reset(&mut self) {
        self.contact = self.pad.center;
        self.dirty = true;
    }

    pub fn pad(&self) -> Pad {
        self.pad
    }

    pub fn contact(&self) -> Point {
        self.contact
    }

    /// Consume the redraw flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn snapshot(&self) -> PadSnapshot {
        PadSnapshot {
            pad: self.pad,
            contact: self.contact,
        }
    }
}
