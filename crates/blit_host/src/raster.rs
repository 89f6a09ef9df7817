//! # Software Raster Surface
//!
//! An RGBA8 pixel buffer that implements [`Surface`], so the animation can
//! run without a window.
//!
//! Coverage is sampled at pixel centers. Everything is composited with
//! straight-alpha source-over blending, clipped to the buffer.
//!
//! Text has no font backend: each non-space character is drawn as a filled
//! box sized from the font size. Position and extent match what a real
//! font would roughly occupy, which is all the overlay needs.

use blit_core::{Color, Point, Region, Surface, SurfaceError, SurfaceResult, TextStyle};

/// One RGBA8 pixel.
pub type Pixel = [u8; 4];

/// Horizontal advance per character, as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.6;
/// Glyph box width, as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
/// Glyph box height above the baseline, as a fraction of the font size.
const GLYPH_ASCENT: f32 = 0.7;

/// A host surface that knows its own extent.
///
/// The host reads [`Canvas::bounds`] before every pass and hands it to the
/// core as the current region.
pub trait Canvas: Surface {
    /// Current drawable region.
    fn bounds(&self) -> Region;

    /// Changes the drawable extent.
    fn resize(&mut self, width: u32, height: u32);
}

/// Converts a normalized color to RGBA8.
#[must_use]
pub fn to_pixel(color: Color) -> Pixel {
    color.to_array().map(unit_to_byte)
}

fn unit_to_byte(value: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let byte = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    byte
}

/// Source-over blend of `src` onto `dst` (straight alpha).
#[must_use]
pub fn blend(dst: Pixel, src: Color) -> Pixel {
    let sa = src.a.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0; 4];
    }

    let channel = |s: f32, d: u8| {
        let d = f32::from(d) / 255.0;
        unit_to_byte((s * sa + d * da * (1.0 - sa)) / out_a)
    };
    [
        channel(src.r, dst[0]),
        channel(src.g, dst[1]),
        channel(src.b, dst[2]),
        unit_to_byte(out_a),
    ]
}

/// RGBA8 raster implementing the core drawing operations.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelSurface {
    /// Creates a transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Raw bytes, ready for upload or encoding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel index range covering `[min, max)` on one axis, clipped.
    fn span(min: f32, max: f32, limit: u32) -> std::ops::Range<u32> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let clip = |v: f32| v.clamp(0.0, limit as f32) as u32;
        // Pixel i is covered when its center i + 0.5 lies in [min, max).
        clip((min - 0.5).ceil())..clip((max - 0.5).ceil())
    }

    /// Blends `color` into every pixel in the box whose center passes `covered`.
    fn paint(
        &mut self,
        min: Point,
        max: Point,
        color: Color,
        covered: impl Fn(Point) -> bool,
    ) -> SurfaceResult {
        if !color.is_normalized() {
            return Err(SurfaceError::Rejected {
                operation: "paint",
                reason: format!("color out of range: {color:?}"),
            });
        }

        let width = self.width as usize;
        for y in Self::span(min.y, max.y, self.height) {
            for x in Self::span(min.x, max.x, self.width) {
                #[allow(clippy::cast_precision_loss)]
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if !covered(center) {
                    continue;
                }
                if let Some(pixel) = self.pixels.get_mut(y as usize * width + x as usize) {
                    *pixel = blend(*pixel, color);
                }
            }
        }
        Ok(())
    }

    fn glyph_boxes(text: &str, position: Point, font_size: f32) -> impl Iterator<Item = Region> + '_ {
        let advance = font_size * GLYPH_ADVANCE;
        let ascent = font_size * GLYPH_ASCENT;
        text.chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(move |(i, _)| {
                #[allow(clippy::cast_precision_loss)]
                let x = position.x + i as f32 * advance;
                Region::new(x, position.y - ascent, font_size * GLYPH_WIDTH, ascent)
            })
    }
}

impl Canvas for PixelSurface {
    #[allow(clippy::cast_precision_loss)]
    fn bounds(&self) -> Region {
        Region::from_size(self.width as f32, self.height as f32)
    }

    /// Resizes the buffer, discarding its contents.
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, [0; 4]);
    }
}

/// Squared distance from `p` to the segment `a..b`.
fn segment_distance_squared(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_squared = dx * dx + dy * dy;
    if length_squared <= f32::EPSILON {
        return p.distance_squared(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_squared).clamp(0.0, 1.0);
    p.distance_squared(Point::new(a.x + t * dx, a.y + t * dy))
}

impl Surface for PixelSurface {
    fn fill_rect(&mut self, rect: Region, color: Color) -> SurfaceResult {
        let (min, max) = (rect.origin(), Point::new(rect.right(), rect.bottom()));
        self.paint(min, max, color, |_| true)
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) -> SurfaceResult {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SurfaceError::Rejected {
                operation: "fill_circle",
                reason: format!("invalid radius {radius}"),
            });
        }
        let r2 = radius * radius;
        self.paint(
            center.offset(-radius, -radius),
            center.offset(radius, radius),
            color,
            |p| p.distance_squared(center) <= r2,
        )
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) -> SurfaceResult {
        if !width.is_finite() || width < 0.0 {
            return Err(SurfaceError::Rejected {
                operation: "stroke_line",
                reason: format!("invalid width {width}"),
            });
        }
        // Hairlines still cover the pixels they pass through.
        let half = (width / 2.0).max(0.5);
        let min = Point::new(from.x.min(to.x) - half, from.y.min(to.y) - half);
        let max = Point::new(from.x.max(to.x) + half, from.y.max(to.y) + half);
        let h2 = half * half;
        self.paint(min, max, color, |p| segment_distance_squared(p, from, to) <= h2)
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> SurfaceResult {
        if let Some(shadow) = style.shadow {
            let shadow_origin = position.offset(shadow.offset.x, shadow.offset.y);
            for glyph in Self::glyph_boxes(text, shadow_origin, style.font_size) {
                let spread = shadow.blur.max(0.0);
                let grown = Region::new(
                    glyph.x - spread,
                    glyph.y - spread,
                    glyph.width + 2.0 * spread,
                    glyph.height + 2.0 * spread,
                );
                self.fill_rect(grown, shadow.color)?;
            }
        }
        for glyph in Self::glyph_boxes(text, position, style.font_size) {
            self.fill_rect(glyph, style.color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blit_core::Shadow;

    #[test]
    fn test_fill_rect_clips() {
        let mut surface = PixelSurface::new(4, 4);
        surface
            .fill_rect(Region::new(-10.0, -10.0, 12.0, 12.0), Color::WHITE)
            .unwrap();

        assert_eq!(surface.pixel(0, 0), Some([255; 4]));
        assert_eq!(surface.pixel(1, 1), Some([255; 4]));
        assert_eq!(surface.pixel(2, 2), Some([0; 4]));
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn test_background_is_opaque() {
        let mut surface = PixelSurface::new(8, 8);
        surface.fill_rect(surface.bounds(), Color::NAVY).unwrap();

        let navy = to_pixel(Color::NAVY);
        assert!(surface.pixels().iter().all(|p| *p == navy));
        assert_eq!(navy, [0x00, 0x33, 0x66, 0xFF]);
    }

    #[test]
    fn test_blend_half_white_over_black() {
        let out = blend([0, 0, 0, 255], Color::WHITE.with_alpha(0.5));
        assert_eq!(out[3], 255);
        assert!((127..=128).contains(&out[0]));
        assert_eq!(blend([10, 20, 30, 255], Color::TRANSPARENT), [10, 20, 30, 255]);
    }

    #[test]
    fn test_circle_coverage() {
        let mut surface = PixelSurface::new(20, 20);
        surface
            .fill_circle(Point::new(10.0, 10.0), 3.0, Color::WHITE)
            .unwrap();

        assert_eq!(surface.pixel(10, 10), Some([255; 4]));
        assert_eq!(surface.pixel(0, 0), Some([0; 4]));
        assert_eq!(surface.pixel(16, 10), Some([0; 4]));
    }

    #[test]
    fn test_thick_line() {
        let mut surface = PixelSurface::new(20, 20);
        surface
            .stroke_line(Point::new(0.0, 10.0), Point::new(20.0, 10.0), 4.0, Color::WHITE)
            .unwrap();

        assert_eq!(surface.pixel(5, 9), Some([255; 4]));
        assert_eq!(surface.pixel(5, 11), Some([255; 4]));
        assert_eq!(surface.pixel(5, 2), Some([0; 4]));
    }

    #[test]
    fn test_degenerate_line_still_marks() {
        let mut surface = PixelSurface::new(4, 4);
        surface
            .stroke_line(Point::new(1.5, 1.5), Point::new(1.5, 1.5), 0.0, Color::WHITE)
            .unwrap();
        assert_eq!(surface.pixel(1, 1), Some([255; 4]));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut surface = PixelSurface::new(4, 4);
        assert!(surface
            .stroke_line(Point::ORIGIN, Point::new(1.0, 1.0), f32::NAN, Color::WHITE)
            .is_err());
        assert!(surface
            .fill_circle(Point::ORIGIN, -1.0, Color::WHITE)
            .is_err());
        assert!(surface
            .fill_rect(surface.bounds(), Color::rgba(2.0, 0.0, 0.0, 1.0))
            .is_err());
    }

    #[test]
    fn test_text_with_shadow() {
        let mut surface = PixelSurface::new(100, 60);
        let style = TextStyle {
            font_size: 20.0,
            color: Color::WHITE,
            shadow: Some(Shadow {
                offset: Point::new(2.0, 2.0),
                blur: 1.0,
                color: Color::BLACK,
            }),
        };
        surface.draw_text("ab", Point::new(10.0, 40.0), &style).unwrap();

        // Glyph interior is text color, shadow peeks out below-right.
        assert_eq!(surface.pixel(12, 35), Some([255; 4]));
        assert_eq!(surface.pixel(21, 41), Some([0, 0, 0, 255]));
        // Nothing left of the first glyph.
        assert_eq!(surface.pixel(2, 35), Some([0; 4]));
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut surface = PixelSurface::new(2, 2);
        surface.fill_rect(surface.bounds(), Color::WHITE).unwrap();
        surface.resize(3, 1);

        assert_eq!(surface.bounds(), Region::from_size(3.0, 1.0));
        assert_eq!(surface.pixels(), &[[0; 4]; 3]);
    }

    #[test]
    fn test_as_bytes_layout() {
        let mut surface = PixelSurface::new(2, 1);
        surface
            .fill_rect(Region::new(1.0, 0.0, 1.0, 1.0), Color::hex(0x1122_33FF))
            .unwrap();
        assert_eq!(surface.as_bytes(), &[0, 0, 0, 0, 0x11, 0x22, 0x33, 0xFF]);
    }
}
