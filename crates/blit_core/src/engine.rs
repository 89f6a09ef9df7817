//! Entry points the host calls.
//!
//! [`BlitEngine`] owns both loops and the scene for hosts that dispatch every
//! timer callback on one thread. Hosts with worker-thread timers call
//! [`BlitEngine::into_drivers`] and hand one driver to each timer; the
//! drivers share the scene through a lock.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::BlitConfig;
use crate::error::BlitResult;
use crate::factory::ElementFactory;
use crate::geometry::Region;
use crate::mutation::{MutationLoop, MutationStats, MutationTick};
use crate::render::{FrameReport, RenderLoop, RenderStats};
use crate::scene::{Scene, SharedScene};
use crate::surface::Surface;

/// Scene plus both loops, driven from a single thread.
#[derive(Debug)]
pub struct BlitEngine<R = ChaCha8Rng> {
    scene: Scene,
    mutation: MutationLoop<R>,
    render: RenderLoop,
}

impl BlitEngine<ChaCha8Rng> {
    /// Builds an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlitError::InvalidConfig`] if the configuration
    /// fails validation.
    pub fn from_config(config: &BlitConfig) -> BlitResult<Self> {
        config.validate()?;

        let style = config.style.resolve();
        let factory = match config.seed {
            Some(seed) => ElementFactory::seeded(seed, style),
            None => ElementFactory::from_entropy(style),
        };

        let drawables = &config.drawables;
        tracing::info!(
            max_capacity = drawables.max_capacity,
            batch_size = drawables.batch_size,
            kind = ?drawables.kind,
            seed = ?config.seed,
            "engine configured"
        );

        Ok(Self::new(
            Scene::new(drawables.max_capacity, drawables.batch_size),
            MutationLoop::new(factory, drawables.kind),
            RenderLoop::new(style, config.style.overlay_label.clone()),
        ))
    }
}

impl<R: Rng> BlitEngine<R> {
    /// Assembles an engine from its parts.
    #[must_use]
    pub fn new(scene: Scene, mutation: MutationLoop<R>, render: RenderLoop) -> Self {
        Self {
            scene,
            mutation,
            render,
        }
    }

    /// Mutation timer callback.
    pub fn on_mutation_tick(&mut self) -> MutationTick {
        self.mutation.on_tick(&mut self.scene)
    }

    /// Draw entry point: repaints `region` onto `surface`.
    ///
    /// # Errors
    ///
    /// Propagates host draw failures; only this frame is lost.
    pub fn on_render_request<S: Surface + ?Sized>(
        &mut self,
        region: Region,
        surface: &mut S,
    ) -> BlitResult<FrameReport> {
        self.render.draw_pass(&mut self.scene, region, surface)
    }

    /// Clears every primitive.
    pub fn reset(&mut self) {
        self.scene.reset();
    }

    /// Returns the scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutation loop counters.
    #[must_use]
    pub const fn mutation_stats(&self) -> MutationStats {
        self.mutation.stats()
    }

    /// Render loop counters.
    #[must_use]
    pub const fn render_stats(&self) -> RenderStats {
        self.render.stats()
    }

    /// Splits into two drivers sharing the scene behind a lock.
    #[must_use]
    pub fn into_drivers(self) -> (MutationDriver<R>, RenderDriver) {
        let scene = self.scene.into_shared();
        (
            MutationDriver {
                scene: scene.clone(),
                mutation: self.mutation,
            },
            RenderDriver {
                scene,
                render: self.render,
            },
        )
    }
}

/// Mutation side of a split engine.
#[derive(Debug)]
pub struct MutationDriver<R = ChaCha8Rng> {
    scene: SharedScene,
    mutation: MutationLoop<R>,
}

impl<R: Rng> MutationDriver<R> {
    /// Mutation timer callback.
    pub fn on_mutation_tick(&mut self) -> MutationTick {
        self.mutation.on_shared_tick(&self.scene)
    }

    /// Mutation loop counters.
    #[must_use]
    pub const fn stats(&self) -> MutationStats {
        self.mutation.stats()
    }

    /// The shared scene.
    #[must_use]
    pub const fn scene(&self) -> &SharedScene {
        &self.scene
    }
}

/// Render side of a split engine.
#[derive(Debug)]
pub struct RenderDriver {
    scene: SharedScene,
    render: RenderLoop,
}

impl RenderDriver {
    /// Draw entry point: repaints `region` onto `surface`.
    ///
    /// # Errors
    ///
    /// Propagates host draw failures; only this frame is lost.
    pub fn on_render_request<S: Surface + ?Sized>(
        &mut self,
        region: Region,
        surface: &mut S,
    ) -> BlitResult<FrameReport> {
        self.render.draw_shared_pass(&self.scene, region, surface)
    }

    /// Render loop counters.
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.render.stats()
    }

    /// The shared scene.
    #[must_use]
    pub const fn scene(&self) -> &SharedScene {
        &self.scene
    }
}
