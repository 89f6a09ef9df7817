//! Random element factory.
//!
//! Produces one primitive per call, bounded by the region the host last
//! reported. The only state carried between calls is the random source, so
//! a seeded factory replays the same picture.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Region};
use crate::primitive::{Ball, Line, Primitive};
use crate::style::{Color, SurfaceStyle};

/// Which primitives a mutation tick generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Stroked lines only.
    #[default]
    Lines,
    /// Filled balls only.
    Balls,
    /// Coin flip per primitive.
    Mixed,
}

/// Builds random primitives inside a region.
#[derive(Debug, Clone)]
pub struct ElementFactory<R = ChaCha8Rng> {
    rng: R,
    style: SurfaceStyle,
}

impl ElementFactory<ChaCha8Rng> {
    /// Creates a reproducible factory.
    #[must_use]
    pub fn seeded(seed: u64, style: SurfaceStyle) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed), style)
    }

    /// Creates a factory seeded from the operating system.
    #[must_use]
    pub fn from_entropy(style: SurfaceStyle) -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy(), style)
    }
}

impl<R: Rng> ElementFactory<R> {
    /// Creates a factory over any random source.
    #[must_use]
    pub const fn with_rng(rng: R, style: SurfaceStyle) -> Self {
        Self { rng, style }
    }

    /// Returns the style table the factory draws its bounds from.
    #[must_use]
    pub const fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    #[inline]
    fn unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Picks a point uniformly inside `bounds`.
    ///
    /// A zero-width or zero-height region yields its origin corner on that
    /// axis.
    pub fn random_point(&mut self, bounds: &Region) -> Point {
        let u = self.unit();
        let v = self.unit();
        bounds.lerp(u, v)
    }

    /// Picks random color channels with the table's fixed alpha.
    pub fn random_color(&mut self) -> Color {
        let r = self.unit();
        let g = self.unit();
        let b = self.unit();
        Color::rgba(r, g, b, self.style.element_alpha)
    }

    /// Builds a random line.
    pub fn make_line(&mut self, bounds: &Region) -> Primitive {
        let from = self.random_point(bounds);
        let to = self.random_point(bounds);
        let color = self.random_color();
        let width = self.unit() * self.style.stroke_base_size;
        Primitive::Line(Line { from, to, color, width })
    }

    /// Builds a random ball.
    pub fn make_ball(&mut self, bounds: &Region) -> Primitive {
        let center = self.random_point(bounds);
        let color = self.random_color();
        let radius = self.unit() * self.style.ball_base_radius;
        Primitive::Ball(Ball { center, radius, color })
    }

    /// Builds one primitive of the requested kind.
    pub fn make(&mut self, kind: ElementKind, bounds: &Region) -> Primitive {
        match kind {
            ElementKind::Lines => self.make_line(bounds),
            ElementKind::Balls => self.make_ball(bounds),
            ElementKind::Mixed => {
                if self.rng.gen::<bool>() {
                    self.make_line(bounds)
                } else {
                    self.make_ball(bounds)
                }
            }
        }
    }

    /// Builds `count` primitives of the requested kind.
    pub fn make_batch(&mut self, kind: ElementKind, bounds: &Region, count: usize) -> Vec<Primitive> {
        (0..count).map(|_| self.make(kind, bounds)).collect()
    }
}
