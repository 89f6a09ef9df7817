//! # Render Loop
//!
//! The render timer only asks the host to invalidate. The host then calls
//! back with the current region and a surface, and the draw pass runs to
//! completion on the caller's thread:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DRAW PASS                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. Record region (bounds the next mutation ticks)           │
//! │  2. Clear background across the whole region                 │
//! │  3. Snapshot the drawable set, draw each in snapshot order   │
//! │  4. Overlay text with the new counter, clamped into region   │
//! │  5. Commit the counter                                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing is strictly sequential. Any surface error aborts the pass and is
//! handed back to the host; the next tick starts clean.

use std::fmt::Write as _;

use crate::drawable_set::Snapshot;
use crate::error::BlitResult;
use crate::geometry::Region;
use crate::scene::{Scene, SharedScene};
use crate::style::SurfaceStyle;
use crate::surface::{Surface, SurfaceError};

/// Default overlay prefix; the counter follows in parentheses.
pub const DEFAULT_OVERLAY_LABEL: &str = "frame ";

/// Monotonic count of completed draw passes.
///
/// Owned by one [`RenderLoop`]. Wraps at `u64::MAX` instead of panicking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameCounter(u64);

impl FrameCounter {
    /// Creates a counter starting at `value`.
    #[must_use]
    pub const fn starting_at(value: u64) -> Self {
        Self(value)
    }

    /// Current value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The value the next completed pass will show.
    #[must_use]
    pub const fn peek_next(self) -> u64 {
        self.0.wrapping_add(1)
    }

    /// Advances by one and returns the new value.
    pub fn advance(&mut self) -> u64 {
        self.0 = self.peek_next();
        self.0
    }
}

/// Summary of one completed draw pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame counter value shown by this pass.
    pub frame: u64,
    /// Primitives drawn from the snapshot.
    pub drawn: usize,
    /// Region that was repainted.
    pub region: Region,
    /// Drawable-set generation the snapshot came from.
    pub generation: u64,
}

/// Counters for the render loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Passes that completed.
    pub frames: u64,
    /// Passes aborted by a surface error.
    pub failed: u64,
    /// Primitives drawn by the most recent completed pass.
    pub last_drawn: usize,
}

/// Draws the scene and the frame counter overlay.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    frames: FrameCounter,
    style: SurfaceStyle,
    label: String,
    overlay: String,
    stats: RenderStats,
}

impl RenderLoop {
    /// Creates a render loop with the given style and overlay label.
    #[must_use]
    pub fn new(style: SurfaceStyle, label: impl Into<String>) -> Self {
        Self {
            frames: FrameCounter::default(),
            style,
            label: label.into(),
            overlay: String::with_capacity(32),
            stats: RenderStats::default(),
        }
    }

    /// Returns the frame counter.
    #[must_use]
    pub const fn frames(&self) -> FrameCounter {
        self.frames
    }

    /// Returns the loop's counters.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Returns the style table.
    #[must_use]
    pub const fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    /// Full draw pass over a scene the caller owns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlitError::Surface`] if the surface rejects any call.
    /// The frame counter does not move for an aborted pass.
    pub fn draw_pass<S: Surface + ?Sized>(
        &mut self,
        scene: &mut Scene,
        region: Region,
        surface: &mut S,
    ) -> BlitResult<FrameReport> {
        let snapshot = scene.observe(region);
        self.draw_snapshot(&snapshot, region, surface)
    }

    /// Full draw pass over a shared scene.
    ///
    /// The lock is held only while recording the region and taking the
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`RenderLoop::draw_pass`].
    pub fn draw_shared_pass<S: Surface + ?Sized>(
        &mut self,
        scene: &SharedScene,
        region: Region,
        surface: &mut S,
    ) -> BlitResult<FrameReport> {
        let snapshot = scene.observe(region);
        self.draw_snapshot(&snapshot, region, surface)
    }

    /// Draws an already-taken snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`RenderLoop::draw_pass`].
    pub fn draw_snapshot<S: Surface + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        region: Region,
        surface: &mut S,
    ) -> BlitResult<FrameReport> {
        match self.paint(snapshot, region, surface) {
            Ok(report) => {
                self.stats.frames += 1;
                self.stats.last_drawn = report.drawn;
                Ok(report)
            }
            Err(err) => {
                self.stats.failed += 1;
                tracing::warn!(frame = self.frames.peek_next(), %err, "draw pass aborted");
                Err(err.into())
            }
        }
    }

    fn paint<S: Surface + ?Sized>(
        &mut self,
        snapshot: &Snapshot,
        region: Region,
        surface: &mut S,
    ) -> Result<FrameReport, SurfaceError> {
        surface.fill_rect(region, self.style.background)?;

        for primitive in snapshot {
            primitive.draw(&mut *surface)?;
        }

        let frame = self.frames.peek_next();
        self.overlay.clear();
        self.overlay.push_str(&self.label);
        // Formatting into a String only fails if a Display impl does.
        write!(self.overlay, "({frame})").ok();

        let overlay = self.style.overlay;
        let position = region.clamp_offset(overlay.anchor);
        surface.draw_text(&self.overlay, position, &overlay.text)?;

        self.frames.advance();
        Ok(FrameReport {
            frame,
            drawn: snapshot.len(),
            region,
            generation: snapshot.generation(),
        })
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(SurfaceStyle::DEFAULT, DEFAULT_OVERLAY_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::primitive::{Ball, Line, Primitive};
    use crate::style::{Color, TextStyle};
    use crate::surface::{CommandRecorder, DrawCommand, SurfaceResult};
    use crate::BlitError;

    fn line(x: f32) -> Primitive {
        Primitive::Line(Line {
            from: Point::new(x, 0.0),
            to: Point::new(x, 10.0),
            color: Color::WHITE,
            width: 1.0,
        })
    }

    /// Accepts a fixed number of calls, then fails every one after.
    struct FlakySurface {
        remaining: usize,
    }

    impl FlakySurface {
        fn step(&mut self, operation: &'static str) -> SurfaceResult {
            if self.remaining == 0 {
                return Err(SurfaceError::Rejected {
                    operation,
                    reason: "out of budget".into(),
                });
            }
            self.remaining -= 1;
            Ok(())
        }
    }

    impl Surface for FlakySurface {
        fn fill_rect(&mut self, _: Region, _: Color) -> SurfaceResult {
            self.step("fill_rect")
        }
        fn fill_circle(&mut self, _: Point, _: f32, _: Color) -> SurfaceResult {
            self.step("fill_circle")
        }
        fn stroke_line(&mut self, _: Point, _: Point, _: f32, _: Color) -> SurfaceResult {
            self.step("stroke_line")
        }
        fn draw_text(&mut self, _: &str, _: Point, _: &TextStyle) -> SurfaceResult {
            self.step("draw_text")
        }
    }

    #[test]
    fn test_pass_order() {
        let mut scene = Scene::new(10, 2);
        scene.insert_batch(vec![line(1.0), line(2.0)]);
        let region = Region::from_size(400.0, 300.0);

        let mut render = RenderLoop::default();
        let mut recorder = CommandRecorder::new();
        let report = render.draw_pass(&mut scene, region, &mut recorder).unwrap();

        let commands = recorder.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            DrawCommand::FillRect {
                rect: region,
                color: SurfaceStyle::DEFAULT.background,
            }
        );
        assert!(matches!(commands[1], DrawCommand::StrokeLine { from, .. } if from.x == 1.0));
        assert!(matches!(commands[2], DrawCommand::StrokeLine { from, .. } if from.x == 2.0));
        let DrawCommand::Text { text, position, style } = &commands[3] else {
            panic!("overlay must be drawn last");
        };
        assert_eq!(text, "frame (1)");
        assert_eq!(*position, Point::new(20.0, 50.0));
        assert_eq!(*style, SurfaceStyle::DEFAULT.overlay.text);

        assert_eq!(report.frame, 1);
        assert_eq!(report.drawn, 2);
        assert_eq!(scene.region(), Some(region));
    }

    #[test]
    fn test_counter_advances_once_per_pass() {
        let mut scene = Scene::new(10, 1);
        let mut render = RenderLoop::new(SurfaceStyle::DEFAULT, "n=");
        let mut recorder = CommandRecorder::new();

        for expected in 1..=5 {
            recorder.begin_frame();
            let report = render
                .draw_pass(&mut scene, Region::from_size(10.0, 10.0), &mut recorder)
                .unwrap();
            assert_eq!(report.frame, expected);
            assert_eq!(render.frames().value(), expected);
        }

        assert!(matches!(
            recorder.commands().last(),
            Some(DrawCommand::Text { text, .. }) if text == "n=(5)"
        ));
    }

    #[test]
    fn test_overlay_clamped_into_small_region() {
        let mut scene = Scene::new(10, 1);
        let mut render = RenderLoop::default();
        let mut recorder = CommandRecorder::new();

        render
            .draw_pass(&mut scene, Region::new(5.0, 5.0, 12.0, 30.0), &mut recorder)
            .unwrap();

        let Some(DrawCommand::Text { position, .. }) = recorder.commands().last() else {
            panic!("missing overlay");
        };
        assert_eq!(*position, Point::new(17.0, 35.0));
    }

    #[test]
    fn test_counter_wraps() {
        let mut counter = FrameCounter::starting_at(u64::MAX);
        assert_eq!(counter.advance(), 0);
        assert_eq!(counter.advance(), 1);
    }

    #[test]
    fn test_failure_aborts_only_that_frame() {
        let mut scene = Scene::new(10, 1);
        scene.insert_batch(vec![Primitive::Ball(Ball {
            center: Point::new(3.0, 3.0),
            radius: 2.0,
            color: Color::WHITE,
        })]);
        let region = Region::from_size(50.0, 50.0);
        let mut render = RenderLoop::default();

        // Background succeeds, the ball fails.
        let mut flaky = FlakySurface { remaining: 1 };
        let err = render.draw_pass(&mut scene, region, &mut flaky).unwrap_err();
        assert!(matches!(
            err,
            BlitError::Surface(SurfaceError::Rejected { operation: "fill_circle", .. })
        ));
        assert_eq!(render.frames().value(), 0);
        assert_eq!(render.stats().failed, 1);

        let mut recorder = CommandRecorder::new();
        let report = render.draw_pass(&mut scene, region, &mut recorder).unwrap();
        assert_eq!(report.frame, 1);
        assert_eq!(render.stats().frames, 1);
    }

    #[test]
    fn test_snapshot_frozen_during_pass() {
        let shared = Scene::new(10, 1).into_shared();
        shared.insert_batch(vec![line(1.0)]);
        let snapshot = shared.observe(Region::from_size(20.0, 20.0));
        shared.insert_batch(vec![line(2.0)]);

        let mut render = RenderLoop::default();
        let mut recorder = CommandRecorder::new();
        let report = render
            .draw_snapshot(&snapshot, Region::from_size(20.0, 20.0), &mut recorder)
            .unwrap();

        assert_eq!(report.drawn, 1);
        assert_eq!(shared.len(), 2);
    }
}
