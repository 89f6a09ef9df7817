//! # Hosts
//!
//! Two ways to drive a [`BlitEngine`] against a [`Canvas`]:
//!
//! ```text
//! EventLoopHost (one thread)            ThreadedHost (two timer threads)
//! ──────────────────────────            ────────────────────────────────
//! select! {                             mutation timer ──▶ MutationDriver ─┐
//!   control   ──▶ resize / reset / stop                                    ├─ SharedScene
//!   mutation  ──▶ engine.on_mutation_tick render timer ──▶ RenderDriver ───┘    (Mutex)
//!   render    ──▶ mark invalid                               │
//! }                                                          ▼
//! invalid? ──▶ one draw pass                               Canvas (Mutex)
//! ```
//!
//! The event-loop host never interleaves an insert with a pass because both
//! run on its single thread. The threaded host serializes them through the
//! scene lock instead.
//!
//! Stopping either host lets an in-flight pass finish; nothing is cut short.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use blit_core::{
    BlitConfig, BlitEngine, MutationDriver, MutationStats, RenderDriver, RenderStats, TimingConfig,
};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{HostError, HostResult};
use crate::raster::{Canvas, PixelSurface};
use crate::timer::{Cadence, RecurringTimer};

/// Control messages for a running [`EventLoopHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Changes the canvas extent. The next pass uses the new region.
    Resize {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// Clears every primitive.
    Reset,
}

/// Final state handed back when a host stops.
#[derive(Debug)]
pub struct HostReport<C = PixelSurface> {
    /// Canvas as left by the last completed pass.
    pub canvas: C,
    /// Mutation loop counters.
    pub mutation: MutationStats,
    /// Render loop counters.
    pub render: RenderStats,
    /// Passes aborted by a canvas failure.
    pub draw_failures: u64,
    /// Render ticks that fell due while a pass was running and were folded
    /// into the next one instead of drawing again.
    pub coalesced: u64,
    /// Render ticks that fell due, coalesced ones included.
    pub render_ticks: u64,
    /// Wall time the host ran.
    pub elapsed: Duration,
}

/// Single-thread host: both ticks are dispatched from one `select!` loop.
#[derive(Debug)]
pub struct EventLoopHost<C: Canvas + Send + 'static = PixelSurface> {
    control: Option<Sender<HostCommand>>,
    handle: Option<JoinHandle<HostReport<C>>>,
}

impl EventLoopHost<PixelSurface> {
    /// Builds the engine and a [`PixelSurface`] from `config` and starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the loop thread
    /// cannot be spawned.
    pub fn spawn(config: &BlitConfig) -> HostResult<Self> {
        let engine = BlitEngine::from_config(config)?;
        let canvas = PixelSurface::new(config.surface.width, config.surface.height);
        Self::spawn_with(engine, canvas, &config.timing)
    }
}

impl<C: Canvas + Send + 'static> EventLoopHost<C> {
    /// Starts the loop thread with an existing engine and canvas.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Spawn`] if the thread cannot be created.
    pub fn spawn_with(engine: BlitEngine, canvas: C, timing: &TimingConfig) -> HostResult<Self> {
        let (control_tx, control_rx) = unbounded();
        let mutation = Cadence::new(timing.mutation_initial_delay(), timing.mutation_period());
        let render = Cadence::new(timing.render_initial_delay(), timing.render_period());

        let handle = thread::Builder::new()
            .name("blit-event-loop".into())
            .spawn(move || EventLoop::new(engine, canvas, mutation, render).run(control_rx))
            .map_err(|source| HostError::Spawn {
                name: "blit-event-loop".into(),
                source,
            })?;

        tracing::info!(
            mutation_period = ?timing.mutation_period(),
            render_period = ?timing.render_period(),
            "event loop host started"
        );
        Ok(Self {
            control: Some(control_tx),
            handle: Some(handle),
        })
    }

    /// Queues a control message.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Stopped`] if the loop has exited.
    pub fn send(&self, command: HostCommand) -> HostResult<()> {
        self.control
            .as_ref()
            .ok_or(HostError::Stopped)?
            .send(command)
            .map_err(|_| HostError::Stopped)
    }

    /// Stops both cadences and waits for the loop to exit.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Panicked`] if the loop thread panicked.
    pub fn shutdown(mut self) -> HostResult<HostReport<C>> {
        // Dropping the sender is the stop signal.
        drop(self.control.take());
        let handle = self.handle.take().ok_or(HostError::Stopped)?;
        let report = handle
            .join()
            .map_err(|_| HostError::Panicked("blit-event-loop".into()))?;

        tracing::info!(
            frames = report.render.frames,
            failures = report.draw_failures,
            coalesced = report.coalesced,
            "event loop host stopped"
        );
        Ok(report)
    }
}

impl<C: Canvas + Send + 'static> Drop for EventLoopHost<C> {
    fn drop(&mut self) {
        drop(self.control.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("event loop thread panicked");
            }
        }
    }
}

/// State owned by the loop thread.
struct EventLoop<C> {
    engine: BlitEngine,
    canvas: C,
    mutation: Cadence,
    render: Cadence,
    invalid: bool,
    draw_failures: u64,
}

impl<C: Canvas> EventLoop<C> {
    fn new(engine: BlitEngine, canvas: C, mutation: Cadence, render: Cadence) -> Self {
        Self {
            engine,
            canvas,
            mutation,
            render,
            invalid: false,
            draw_failures: 0,
        }
    }

    fn run(mut self, control: Receiver<HostCommand>) -> HostReport<C> {
        let started = Instant::now();

        loop {
            let mutation_ticks = self.mutation.receiver().clone();
            let render_ticks = self.render.receiver().clone();

            select! {
                recv(control) -> command => match command {
                    Ok(command) => self.apply(command),
                    Err(_) => break,
                },
                recv(mutation_ticks) -> scheduled => {
                    self.mutation.fired(scheduled.unwrap_or_else(|_| Instant::now()));
                    self.engine.on_mutation_tick();
                }
                recv(render_ticks) -> scheduled => {
                    self.render.fired(scheduled.unwrap_or_else(|_| Instant::now()));
                    self.invalid = true;
                }
            }

            if self.invalid {
                self.draw();
            }
        }

        HostReport {
            mutation: self.engine.mutation_stats(),
            render: self.engine.render_stats(),
            canvas: self.canvas,
            draw_failures: self.draw_failures,
            coalesced: self.render.overdue_count(),
            render_ticks: self.render.fire_count() + self.render.overdue_count(),
            elapsed: started.elapsed(),
        }
    }

    fn apply(&mut self, command: HostCommand) {
        match command {
            HostCommand::Resize { width, height } => {
                tracing::debug!(width, height, "canvas resized");
                self.canvas.resize(width, height);
            }
            HostCommand::Reset => self.engine.reset(),
        }
    }

    fn draw(&mut self) {
        self.invalid = false;

        let region = self.canvas.bounds();
        if let Err(err) = self.engine.on_render_request(region, &mut self.canvas) {
            self.draw_failures += 1;
            tracing::debug!(%err, failures = self.draw_failures, "frame dropped");
        }
    }
}

struct RenderSide<C> {
    driver: RenderDriver,
    canvas: C,
}

impl<C> std::fmt::Debug for RenderSide<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSide")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

/// Two-thread host: each loop runs on its own [`RecurringTimer`].
///
/// The scene is shared through its lock, so an insert or reset can never
/// land in the middle of a snapshot.
#[derive(Debug)]
pub struct ThreadedHost<C: Canvas + Send + 'static = PixelSurface> {
    mutation_timer: RecurringTimer,
    render_timer: RecurringTimer,
    mutation: Arc<Mutex<MutationDriver>>,
    render: Arc<Mutex<RenderSide<C>>>,
    draw_failures: Arc<AtomicU64>,
    started: Instant,
}

impl ThreadedHost<PixelSurface> {
    /// Builds the engine and a [`PixelSurface`] from `config` and starts both
    /// timers.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a timer thread
    /// cannot be spawned.
    pub fn spawn(config: &BlitConfig) -> HostResult<Self> {
        let engine = BlitEngine::from_config(config)?;
        let canvas = PixelSurface::new(config.surface.width, config.surface.height);
        Self::spawn_with(engine, canvas, &config.timing)
    }
}

impl<C: Canvas + Send + 'static> ThreadedHost<C> {
    /// Splits `engine` into its drivers and starts one timer per loop.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Spawn`] if a timer thread cannot be created.
    pub fn spawn_with(engine: BlitEngine, canvas: C, timing: &TimingConfig) -> HostResult<Self> {
        let (mutation, render) = engine.into_drivers();
        let mutation = Arc::new(Mutex::new(mutation));
        let render = Arc::new(Mutex::new(RenderSide {
            driver: render,
            canvas,
        }));
        let draw_failures = Arc::new(AtomicU64::new(0));

        let mutation_timer = {
            let mutation = Arc::clone(&mutation);
            RecurringTimer::start(
                "blit-mutation",
                timing.mutation_initial_delay(),
                timing.mutation_period(),
                move || {
                    mutation.lock().on_mutation_tick();
                },
            )?
        };

        let render_timer = {
            let render = Arc::clone(&render);
            let draw_failures = Arc::clone(&draw_failures);
            RecurringTimer::start(
                "blit-render",
                timing.render_initial_delay(),
                timing.render_period(),
                move || {
                    let mut side = render.lock();
                    let RenderSide { driver, canvas } = &mut *side;
                    let region = canvas.bounds();
                    if let Err(err) = driver.on_render_request(region, canvas) {
                        let failures = draw_failures.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::debug!(%err, failures, "frame dropped");
                    }
                },
            )?
        };

        tracing::info!("threaded host started");
        Ok(Self {
            mutation_timer,
            render_timer,
            mutation,
            render,
            draw_failures,
            started: Instant::now(),
        })
    }

    /// Changes the canvas extent between passes.
    pub fn resize(&self, width: u32, height: u32) {
        self.render.lock().canvas.resize(width, height);
    }

    /// Clears every primitive.
    pub fn reset(&self) {
        self.mutation.lock().scene().reset();
    }

    /// Stops both timers, waiting for running callbacks to finish.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Panicked`] if a timer callback panicked.
    pub fn shutdown(self) -> HostResult<HostReport<C>> {
        let Self {
            mutation_timer,
            render_timer,
            mutation,
            render,
            draw_failures,
            started,
        } = self;

        mutation_timer.stop()?;
        let ticks = render_timer.stop()?;

        let mutation = mutation.lock().stats();
        // Both timer closures are gone once their threads are joined.
        let side = Arc::try_unwrap(render)
            .map_err(|_| HostError::Panicked("blit-render".into()))?
            .into_inner();

        tracing::info!(frames = side.driver.stats().frames, "threaded host stopped");
        Ok(HostReport {
            canvas: side.canvas,
            mutation,
            render: side.driver.stats(),
            draw_failures: draw_failures.load(Ordering::Relaxed),
            coalesced: ticks.overdue,
            render_ticks: ticks.fired + ticks.overdue,
            elapsed: started.elapsed(),
        })
    }
}
