//! Surface geometry: points and the per-frame dirty region.

use serde::{Deserialize, Serialize};

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Point {
    /// The surface origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this point moved by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// The rectangle of the surface to repaint this frame.
///
/// Supplied by the host with every render request. The core only keeps the
/// most recent one, to bound where new primitives may land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Region {
    /// A zero-sized region at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new region.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a region anchored at the origin.
    #[must_use]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns true if the point is inside the region, edges included.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Maps unit coordinates (`0..=1` on each axis) into the region.
    ///
    /// Negative extents are treated as empty, so a degenerate region maps
    /// every input onto its origin corner.
    #[must_use]
    pub fn lerp(&self, u: f32, v: f32) -> Point {
        Point::new(
            self.x + self.width.max(0.0) * u,
            self.y + self.height.max(0.0) * v,
        )
    }

    /// Clamps a point offset from the origin so it stays inside the region.
    #[must_use]
    pub fn clamp_offset(&self, offset: Point) -> Point {
        Point::new(
            self.x + offset.x.min(self.width.max(0.0)),
            self.y + offset.y.min(self.height.max(0.0)),
        )
    }
}
