//! # Configuration
//!
//! Loaded once at startup from TOML. Every section is optional; omitted keys
//! take the reference values.
//!
//! ```toml
//! seed = 42
//!
//! [drawables]
//! max_capacity = 1000
//! batch_size = 1
//! kind = "lines"
//!
//! [timing]
//! mutation_hz = 24.0
//! render_hz = 60.0
//! render_initial_delay_ms = 1000
//!
//! [style]
//! background = 0x003366FF
//! overlay_label = "frame "
//!
//! [surface]
//! width = 800
//! height = 600
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BlitError, BlitResult};
use crate::factory::ElementKind;
use crate::geometry::Region;
use crate::render::DEFAULT_OVERLAY_LABEL;
use crate::style::{Color, SurfaceStyle};

/// Drawable set sizing and what the mutation loop emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawableConfig {
    /// Maximum population before the set resets.
    pub max_capacity: usize,
    /// Primitives added per mutation tick.
    pub batch_size: usize,
    /// Primitive kind to generate.
    pub kind: ElementKind,
}

impl Default for DrawableConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            batch_size: 1,
            kind: ElementKind::Lines,
        }
    }
}

/// Timer rates. Only the ratio matters to the animation; render must be the
/// faster of the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Mutation ticks per second.
    pub mutation_hz: f64,
    /// Delay before the first mutation tick.
    pub mutation_initial_delay_ms: u64,
    /// Render ticks per second.
    pub render_hz: f64,
    /// Delay before the first render tick.
    pub render_initial_delay_ms: u64,
}

impl TimingConfig {
    /// Period between mutation ticks.
    ///
    /// Saturates to [`Duration::MAX`] for rates [`BlitConfig::validate`]
    /// rejects.
    #[must_use]
    pub fn mutation_period(&self) -> Duration {
        period_of(self.mutation_hz).unwrap_or(Duration::MAX)
    }

    /// Period between render ticks.
    ///
    /// Saturates to [`Duration::MAX`] for rates [`BlitConfig::validate`]
    /// rejects.
    #[must_use]
    pub fn render_period(&self) -> Duration {
        period_of(self.render_hz).unwrap_or(Duration::MAX)
    }

    /// Delay before the first mutation tick.
    #[must_use]
    pub const fn mutation_initial_delay(&self) -> Duration {
        Duration::from_millis(self.mutation_initial_delay_ms)
    }

    /// Delay before the first render tick.
    #[must_use]
    pub const fn render_initial_delay(&self) -> Duration {
        Duration::from_millis(self.render_initial_delay_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mutation_hz: 24.0,
            mutation_initial_delay_ms: 0,
            render_hz: 60.0,
            render_initial_delay_ms: 1000,
        }
    }
}

/// Overrides for the static style table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Background as 0xRRGGBBAA.
    pub background: Option<u32>,
    /// Alpha for generated primitives.
    pub element_alpha: Option<f32>,
    /// Upper bound for random stroke widths.
    pub stroke_base_size: Option<f32>,
    /// Upper bound for random ball radii.
    pub ball_base_radius: Option<f32>,
    /// Overlay font size.
    pub overlay_font_size: Option<f32>,
    /// Text shown before the frame counter.
    pub overlay_label: String,
}

impl StyleConfig {
    /// Applies the overrides on top of [`SurfaceStyle::DEFAULT`].
    #[must_use]
    pub fn resolve(&self) -> SurfaceStyle {
        let mut style = SurfaceStyle::DEFAULT;
        if let Some(hex) = self.background {
            style.background = Color::hex(hex);
        }
        if let Some(alpha) = self.element_alpha {
            style.element_alpha = alpha;
        }
        if let Some(size) = self.stroke_base_size {
            style.stroke_base_size = size;
        }
        if let Some(radius) = self.ball_base_radius {
            style.ball_base_radius = radius;
        }
        if let Some(size) = self.overlay_font_size {
            style.overlay.text.font_size = size;
        }
        style
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: None,
            element_alpha: None,
            stroke_base_size: None,
            ball_base_radius: None,
            overlay_font_size: None,
            overlay_label: DEFAULT_OVERLAY_LABEL.to_owned(),
        }
    }
}

/// Size of the surface a standalone host draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceConfig {
    /// The full-surface region.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn region(&self) -> Region {
        Region::from_size(self.width as f32, self.height as f32)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlitConfig {
    /// Seed for the random source. Entropy when absent.
    pub seed: Option<u64>,
    /// Drawable set settings.
    pub drawables: DrawableConfig,
    /// Timer settings.
    pub timing: TimingConfig,
    /// Style overrides.
    pub style: StyleConfig,
    /// Host surface size.
    pub surface: SurfaceConfig,
}

impl BlitConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BlitError::ConfigParse`] for malformed TOML and
    /// [`BlitError::InvalidConfig`] for values that break an invariant.
    pub fn from_toml_str(source: &str) -> BlitResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`BlitError::ConfigRead`] if the file cannot be read, plus
    /// everything [`BlitConfig::from_toml_str`] can return.
    pub fn load(path: impl AsRef<Path>) -> BlitResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| BlitError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks every invariant the loops rely on.
    ///
    /// # Errors
    ///
    /// Returns [`BlitError::InvalidConfig`] naming the first broken rule.
    pub fn validate(&self) -> BlitResult<()> {
        let drawables = &self.drawables;
        if drawables.max_capacity == 0 {
            return Err(invalid("drawables.max_capacity must be at least 1"));
        }
        if drawables.batch_size == 0 {
            return Err(invalid("drawables.batch_size must be at least 1"));
        }
        if drawables.batch_size > drawables.max_capacity {
            return Err(invalid(format!(
                "drawables.batch_size ({}) exceeds max_capacity ({})",
                drawables.batch_size, drawables.max_capacity
            )));
        }

        let timing = &self.timing;
        for (name, hz) in [("mutation_hz", timing.mutation_hz), ("render_hz", timing.render_hz)] {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(invalid(format!("timing.{name} must be a positive rate, got {hz}")));
            }
            if period_of(hz).is_none() {
                return Err(invalid(format!(
                    "timing.{name} ({hz}) has no representable non-zero period"
                )));
            }
        }
        if timing.render_hz <= timing.mutation_hz {
            return Err(invalid(format!(
                "timing.render_hz ({}) must be faster than mutation_hz ({})",
                timing.render_hz, timing.mutation_hz
            )));
        }

        let style = self.style.resolve();
        if !(0.0..=1.0).contains(&style.element_alpha) {
            return Err(invalid("style.element_alpha must be within 0..=1"));
        }
        for (name, value) in [
            ("stroke_base_size", style.stroke_base_size),
            ("ball_base_radius", style.ball_base_radius),
            ("overlay_font_size", style.overlay.text.font_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("style.{name} must be non-negative, got {value}")));
            }
        }

        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(invalid("surface.width and surface.height must be non-zero"));
        }

        Ok(())
    }
}

/// Tick period for a rate, or `None` when it is zero or too long for a
/// [`Duration`].
fn period_of(hz: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / hz)
        .ok()
        .filter(|period| !period.is_zero())
}

fn invalid(message: impl Into<String>) -> BlitError {
    BlitError::InvalidConfig(message.into())
}
