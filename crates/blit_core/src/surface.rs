//! The host canvas seen from the core.
//!
//! A [`Surface`] is supplied by the host for the duration of one draw pass.
//! Every call carries its own color and stroke parameters: there is no
//! "current fill color" to race on, so a pass can never leak style from one
//! primitive into the next.

use thiserror::Error;

use crate::geometry::{Point, Region};
use crate::style::{Color, TextStyle};

/// Failure reported by the host canvas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The host refused one drawing operation.
    #[error("surface rejected {operation}: {reason}")]
    Rejected {
        /// Operation that failed.
        operation: &'static str,
        /// Host-provided reason.
        reason: String,
    },

    /// The surface was torn down while a pass was running.
    #[error("surface is no longer available")]
    Unavailable,
}

/// Result type for surface operations.
pub type SurfaceResult = Result<(), SurfaceError>;

/// Drawing operations the host canvas must provide.
pub trait Surface {
    /// Fills a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Region, color: Color) -> SurfaceResult;

    /// Fills a circle.
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) -> SurfaceResult;

    /// Strokes a straight line of the given width.
    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) -> SurfaceResult;

    /// Draws left-aligned text with its baseline origin at `position`.
    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> SurfaceResult;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn fill_rect(&mut self, rect: Region, color: Color) -> SurfaceResult {
        (**self).fill_rect(rect, color)
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) -> SurfaceResult {
        (**self).fill_circle(center, radius, color)
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) -> SurfaceResult {
        (**self).stroke_line(from, to, width, color)
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> SurfaceResult {
        (**self).draw_text(text, position, style)
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled rectangle.
    FillRect {
        /// Bounds.
        rect: Region,
        /// Fill color.
        color: Color,
    },
    /// Filled circle.
    FillCircle {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f32,
        /// Fill color.
        color: Color,
    },
    /// Stroked line.
    StrokeLine {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f32,
        /// Stroke color.
        color: Color,
    },
    /// Text run.
    Text {
        /// Text content.
        text: String,
        /// Baseline origin.
        position: Point,
        /// Font, color and shadow.
        style: TextStyle,
    },
}

/// Surface that records commands instead of rasterizing them.
///
/// Hosts that build a display list (or tests that want to inspect a frame)
/// draw into this and replay the commands later.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(1024),
        }
    }

    /// Drops everything recorded so far.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
    }

    /// Returns the recorded commands in draw order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the total command count.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Replays the recorded commands onto another surface.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `target`.
    pub fn replay<S: Surface + ?Sized>(&self, target: &mut S) -> SurfaceResult {
        for command in &self.commands {
            match command {
                DrawCommand::FillRect { rect, color } => target.fill_rect(*rect, *color)?,
                DrawCommand::FillCircle { center, radius, color } => {
                    target.fill_circle(*center, *radius, *color)?;
                }
                DrawCommand::StrokeLine { from, to, width, color } => {
                    target.stroke_line(*from, *to, *width, *color)?;
                }
                DrawCommand::Text { text, position, style } => {
                    target.draw_text(text, *position, style)?;
                }
            }
        }
        Ok(())
    }
}

impl Surface for CommandRecorder {
    fn fill_rect(&mut self, rect: Region, color: Color) -> SurfaceResult {
        self.commands.push(DrawCommand::FillRect { rect, color });
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) -> SurfaceResult {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
        Ok(())
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) -> SurfaceResult {
        self.commands.push(DrawCommand::StrokeLine { from, to, width, color });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) -> SurfaceResult {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            style: *style,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SurfaceStyle;

    #[test]
    fn test_recorder_frame() {
        let mut recorder = CommandRecorder::new();

        recorder.begin_frame();
        recorder
            .fill_rect(Region::from_size(100.0, 50.0), Color::WHITE)
            .unwrap();
        recorder
            .stroke_line(Point::ORIGIN, Point::new(10.0, 10.0), 2.0, Color::BLACK)
            .unwrap();

        assert_eq!(recorder.command_count(), 2);
        assert!(matches!(recorder.commands()[0], DrawCommand::FillRect { .. }));

        recorder.begin_frame();
        assert_eq!(recorder.command_count(), 0);
    }

    #[test]
    fn test_replay_preserves_order() {
        let mut source = CommandRecorder::new();
        source.fill_circle(Point::new(5.0, 5.0), 3.0, Color::WHITE).unwrap();
        source
            .draw_text("hi", Point::new(1.0, 2.0), &SurfaceStyle::DEFAULT.overlay.text)
            .unwrap();

        let mut target = CommandRecorder::new();
        source.replay(&mut target).unwrap();

        assert_eq!(source.commands(), target.commands());
    }
}
