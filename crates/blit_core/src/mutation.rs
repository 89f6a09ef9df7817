//! Mutation loop: one tick, one batch.
//!
//! ```text
//! Idle ──timer──▶ GenerateBatch ──▶ InsertBatch ──▶ Idle
//!                     │
//!                     └── no region observed yet ──▶ Idle (skipped)
//! ```

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::drawable_set::InsertOutcome;
use crate::factory::{ElementFactory, ElementKind};
use crate::primitive::Primitive;
use crate::scene::{Scene, SharedScene};

/// Result of one mutation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationTick {
    /// No frame has reported a region yet; nothing was generated.
    Skipped,
    /// A batch was generated and inserted.
    Inserted(InsertOutcome),
}

/// Counters for the mutation loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Ticks handled, skipped ones included.
    pub ticks: u64,
    /// Ticks skipped because no region was known.
    pub skipped: u64,
    /// Primitives inserted.
    pub inserted: u64,
    /// Overflow resets triggered.
    pub resets: u64,
}

/// Generates primitives on every tick and feeds them to the scene.
#[derive(Debug, Clone)]
pub struct MutationLoop<R = ChaCha8Rng> {
    factory: ElementFactory<R>,
    kind: ElementKind,
    stats: MutationStats,
}

impl<R: Rng> MutationLoop<R> {
    /// Creates a mutation loop around a factory.
    #[must_use]
    pub fn new(factory: ElementFactory<R>, kind: ElementKind) -> Self {
        Self {
            factory,
            kind,
            stats: MutationStats::default(),
        }
    }

    /// Returns the element kind this loop generates.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the loop's counters.
    #[must_use]
    pub const fn stats(&self) -> MutationStats {
        self.stats
    }

    /// Handles one tick against a scene the caller owns.
    pub fn on_tick(&mut self, scene: &mut Scene) -> MutationTick {
        self.stats.ticks += 1;

        let Some(region) = scene.region() else {
            self.stats.skipped += 1;
            return MutationTick::Skipped;
        };

        let batch = self
            .factory
            .make_batch(self.kind, &region, scene.drawables().batch_size());
        self.insert(batch, |batch| scene.insert_batch(batch))
    }

    /// Handles one tick against a shared scene.
    ///
    /// The lock is held only to read the region and to insert; generation
    /// runs outside it.
    pub fn on_shared_tick(&mut self, scene: &SharedScene) -> MutationTick {
        self.stats.ticks += 1;

        let target = scene.with(|s| s.region().map(|r| (r, s.drawables().batch_size())));
        let Some((region, batch_size)) = target else {
            self.stats.skipped += 1;
            return MutationTick::Skipped;
        };

        let batch = self.factory.make_batch(self.kind, &region, batch_size);
        self.insert(batch, |batch| scene.insert_batch(batch))
    }

    fn insert(
        &mut self,
        batch: Vec<Primitive>,
        insert: impl FnOnce(Vec<Primitive>) -> InsertOutcome,
    ) -> MutationTick {
        let added = batch.len() as u64;
        let outcome = insert(batch);

        self.stats.inserted += added;
        if outcome.was_reset() {
            self.stats.resets += 1;
        }
        MutationTick::Inserted(outcome)
    }
}
