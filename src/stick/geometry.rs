//! Pad geometry: clamping and polar conversion
//!
//! All functions are pure. Coordinates are in the control's local space with
//! the y axis growing downward (screen convention).
//!
//! # Reference orientation
//!
//! Angles are measured in whole degrees from "up" (toward negative y) and grow
//! clockwise as seen on screen:
//!
//! ```text
//!             0
//!             |
//!     270 ----+---- 90
//!             |
//!            180
//! ```

use serde::{Deserialize, Serialize};

/// A point in the control's local coordinate space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: Point) -> f32 {
        let (dx, dy) = offset(*self, other);
        dx.hypot(dy) as f32
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// `point - center` in f64, so far-away points cannot overflow the distance
fn offset(point: Point, center: Point) -> (f64, f64) {
    (
        point.x as f64 - center.x as f64,
        point.y as f64 - center.y as f64,
    )
}

/// Clamp `point` to the disk of `radius` around `center`
///
/// Points inside the disk (boundary included) are returned unchanged. Points
/// outside are pulled back along the center->point ray onto the boundary.
/// A degenerate radius or a non-finite point collapses onto the center.
///
/// # Example
/// ```
/// use virtual_stick::stick::geometry::{clamp, Point};
///
/// let center = Point::new(100.0, 100.0);
/// let clamped = clamp(Point::new(300.0, 100.0), center, 50.0);
/// assert_eq!(clamped, Point::new(150.0, 100.0));
/// ```
pub fn clamp(point: Point, center: Point, radius: f32) -> Point {
    if !(radius.is_finite() && radius > 0.0) || !point.is_finite() {
        return center;
    }

    let (dx, dy) = offset(point, center);
    let distance = dx.hypot(dy);

    if distance <= radius as f64 {
        return point;
    }

    let scale = radius as f64 / distance;
    Point::new(
        (center.x as f64 + dx * scale) as f32,
        (center.y as f64 + dy * scale) as f32,
    )
}

/// Angle of `point` around `center`, in degrees `[0, 360)`
///
/// 0 is up, 90 right, 180 down, 270 left. Rounded to the nearest degree; a
/// point on the center has no direction and reports 0.
pub fn angle_of(point: Point, center: Point) -> u16 {
    let (dx, dy) = offset(point, center);

    if dx == 0.0 && dy == 0.0 {
        return 0;
    }

    // atan2(dx, -dy): up (dy < 0) -> 0, right (dx > 0) -> +90
    let degrees = dx.atan2(-dy).to_degrees();
    let normalized = degrees.rem_euclid(360.0).round() as u32;
    (normalized % 360) as u16
}

/// Displacement magnitude as a percentage of `radius`, in `[0, 100]`
///
/// A zero, negative or non-finite radius yields 0 instead of dividing by it.
pub fn power_of(point: Point, center: Point, radius: f32) -> u8 {
    if !(radius.is_finite() && radius > 0.0) {
        return 0;
    }

    let (dx, dy) = offset(point, center);
    let ratio = dx.hypot(dy) / radius as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
