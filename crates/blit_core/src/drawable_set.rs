//! # Bounded Drawable Set
//!
//! Insertion-ordered primitives with a hard ceiling.
//!
//! ## Overflow policy
//!
//! When a batch would push the population past `max_capacity`, the whole set
//! is cleared *before* the batch goes in. Nothing is evicted by age; the
//! picture simply starts over:
//!
//! ```text
//! max_capacity = 4, batch_size = 1
//!
//!  insert → [a]
//!  insert → [a b]
//!  insert → [a b c]
//!  insert → [a b c d]
//!  insert → [e]          ← 4 + 1 > 4, cleared first
//! ```
//!
//! ## Snapshots
//!
//! Storage sits behind an `Arc`. A [`Snapshot`] shares that allocation, and
//! the next write copies it only if a snapshot is still alive. A render pass
//! therefore iterates a frozen view while the mutation side keeps inserting.

use std::ops::Deref;
use std::sync::Arc;

use crate::primitive::Primitive;

/// What an insertion did to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The batch fit and was appended.
    Appended {
        /// Population after the insert.
        len: usize,
    },
    /// The set was cleared, then the batch was inserted.
    Reset {
        /// Primitives dropped by the clear.
        cleared: usize,
        /// Population after the insert.
        len: usize,
    },
}

impl InsertOutcome {
    /// Returns the population after the insert.
    #[must_use]
    pub const fn population(self) -> usize {
        match self {
            Self::Appended { len } | Self::Reset { len, .. } => len,
        }
    }

    /// Returns true if the insert triggered a reset.
    #[must_use]
    pub const fn was_reset(self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}

/// Frozen view of the set at the moment it was taken.
#[derive(Debug, Clone)]
pub struct Snapshot {
    items: Arc<Vec<Primitive>>,
    generation: u64,
}

impl Snapshot {
    /// Generation of the set when the snapshot was taken.
    ///
    /// Changes every time the set is cleared.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl Deref for Snapshot {
    type Target = [Primitive];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Primitive;
    type IntoIter = std::slice::Iter<'a, Primitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Capacity-bounded, self-clearing collection of primitives.
#[derive(Debug)]
pub struct BoundedDrawableSet {
    items: Arc<Vec<Primitive>>,
    max_capacity: usize,
    batch_size: usize,
    generation: u64,
}

impl BoundedDrawableSet {
    /// Creates an empty set.
    ///
    /// `batch_size` is how many primitives a mutation tick adds; it is
    /// clamped into `1..=max_capacity`. A zero capacity is raised to one.
    #[must_use]
    pub fn new(max_capacity: usize, batch_size: usize) -> Self {
        let max_capacity = max_capacity.max(1);
        Self {
            items: Arc::new(Vec::with_capacity(max_capacity)),
            max_capacity,
            batch_size: batch_size.clamp(1, max_capacity),
            generation: 0,
        }
    }

    /// Maximum population.
    #[must_use]
    pub const fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Primitives added per mutation tick.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Current population.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of clears so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Inserts a batch, clearing the set first if the batch would not fit.
    ///
    /// Never fails. A batch larger than the whole capacity keeps only its
    /// newest `max_capacity` primitives.
    pub fn insert_batch(&mut self, batch: Vec<Primitive>) -> InsertOutcome {
        let mut batch = batch;
        if batch.len() > self.max_capacity {
            let excess = batch.len() - self.max_capacity;
            batch.drain(..excess);
        }

        let cleared = if self.len() + batch.len() > self.max_capacity {
            let dropped = self.len();
            self.clear();
            Some(dropped)
        } else {
            None
        };

        Arc::make_mut(&mut self.items).extend(batch);
        let len = self.len();

        match cleared {
            Some(cleared) => {
                tracing::debug!(cleared, len, "drawable set reset on overflow");
                InsertOutcome::Reset { cleared, len }
            }
            None => InsertOutcome::Appended { len },
        }
    }

    /// Takes a point-in-time view of the set.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: Arc::clone(&self.items),
            generation: self.generation,
        }
    }

    /// Empties the set immediately.
    pub fn clear(&mut self) {
        match Arc::get_mut(&mut self.items) {
            Some(items) => items.clear(),
            // A snapshot still holds the old storage; leave it to the reader.
            None => self.items = Arc::new(Vec::with_capacity(self.max_capacity)),
        }
        self.generation = self.generation.wrapping_add(1);
    }
}
