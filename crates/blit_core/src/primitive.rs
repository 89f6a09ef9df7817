//! Renderable primitives.
//!
//! The set of shapes is small and closed, so it is an enum and drawing is a
//! `match`. Primitives are plain values: once built they never change.

use crate::geometry::Point;
use crate::style::Color;
use crate::surface::{Surface, SurfaceResult};

/// A stroked line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point.
    pub from: Point,
    /// End point.
    pub to: Point,
    /// Stroke color, alpha included.
    pub color: Color,
    /// Stroke width.
    pub width: f32,
}

/// A filled circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Center point.
    pub center: Point,
    /// Radius.
    pub radius: f32,
    /// Fill color, alpha included.
    pub color: Color,
}

/// One drawable unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Stroked line.
    Line(Line),
    /// Filled circle.
    Ball(Ball),
}

impl Primitive {
    /// Draws this primitive onto the surface.
    ///
    /// # Errors
    ///
    /// Returns the surface's error unchanged.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> SurfaceResult {
        match self {
            Self::Line(line) => surface.stroke_line(line.from, line.to, line.width, line.color),
            Self::Ball(ball) => surface.fill_circle(ball.center, ball.radius, ball.color),
        }
    }
}

impl From<Line> for Primitive {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Ball> for Primitive {
    fn from(ball: Ball) -> Self {
        Self::Ball(ball)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CommandRecorder, DrawCommand};

    #[test]
    fn test_line_draws_stroke() {
        let line = Primitive::Line(Line {
            from: Point::new(1.0, 2.0),
            to: Point::new(3.0, 4.0),
            color: Color::WHITE,
            width: 2.5,
        });

        let mut recorder = CommandRecorder::new();
        line.draw(&mut recorder).unwrap();

        assert_eq!(
            recorder.commands(),
            &[DrawCommand::StrokeLine {
                from: Point::new(1.0, 2.0),
                to: Point::new(3.0, 4.0),
                width: 2.5,
                color: Color::WHITE,
            }]
        );
    }

    #[test]
    fn test_ball_draws_circle() {
        let ball: Primitive = Ball {
            center: Point::new(5.0, 5.0),
            radius: 4.0,
            color: Color::BLACK,
        }
        .into();

        let mut recorder = CommandRecorder::new();
        ball.draw(&mut recorder).unwrap();

        assert!(matches!(
            recorder.commands()[0],
            DrawCommand::FillCircle { radius, .. } if (radius - 4.0).abs() < f32::EPSILON
        ));
    }
}
