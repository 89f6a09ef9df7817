//! Colors and the static style table for the drawing surface.
//!
//! Every visual constant the loops use lives in [`SurfaceStyle`]. Draw code
//! reads from the table; nothing hides a literal color or size inline.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Deep navy used behind the lines.
    pub const NAVY: Self = Self::hex(0x0033_66FF);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from a hex value (0xRRGGBBAA).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns true if every channel is inside `0..=1`.
    #[must_use]
    pub fn is_normalized(self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Drop shadow behind overlay text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Offset of the shadow from the text.
    pub offset: Point,
    /// Blur radius.
    pub blur: f32,
    /// Shadow color.
    pub color: Color,
}

/// Everything a surface needs to draw one run of text.
///
/// Passed with each call so no font or shadow state leaks between draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in surface units.
    pub font_size: f32,
    /// Text color.
    pub color: Color,
    /// Optional drop shadow.
    pub shadow: Option<Shadow>,
}

/// The status overlay's fixed look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Text style, shadow included.
    pub text: TextStyle,
    /// Preferred anchor, relative to the region origin. Clamped into the
    /// region when the region is smaller.
    pub anchor: Point,
}

/// Static style table for the animated surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    /// Solid fill used to clear the region each frame.
    pub background: Color,
    /// Alpha given to every generated primitive, so lines layer visibly.
    pub element_alpha: f32,
    /// Upper bound for random stroke widths.
    pub stroke_base_size: f32,
    /// Upper bound for random ball radii.
    pub ball_base_radius: f32,
    /// Frame counter overlay.
    pub overlay: OverlayStyle,
}

impl SurfaceStyle {
    /// The reference look: navy background, faint lines, white counter.
    pub const DEFAULT: Self = Self {
        background: Color::NAVY,
        element_alpha: 0.2,
        stroke_base_size: 10.0,
        ball_base_radius: 24.0,
        overlay: OverlayStyle {
            text: TextStyle {
                font_size: 36.0,
                color: Color::WHITE,
                shadow: Some(Shadow {
                    offset: Point::new(2.0, 2.0),
                    blur: 1.0,
                    color: Color::BLACK,
                }),
            },
            anchor: Point::new(20.0, 50.0),
        },
    };
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}
