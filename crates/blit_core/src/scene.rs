//! State shared by the mutation and render loops.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::drawable_set::{BoundedDrawableSet, InsertOutcome, Snapshot};
use crate::geometry::Region;
use crate::primitive::Primitive;

/// The drawable set plus the last region the host reported.
#[derive(Debug)]
pub struct Scene {
    drawables: BoundedDrawableSet,
    region: Option<Region>,
}

impl Scene {
    /// Creates an empty scene with no region observed yet.
    #[must_use]
    pub fn new(max_capacity: usize, batch_size: usize) -> Self {
        Self {
            drawables: BoundedDrawableSet::new(max_capacity, batch_size),
            region: None,
        }
    }

    /// Returns the drawable set.
    #[must_use]
    pub const fn drawables(&self) -> &BoundedDrawableSet {
        &self.drawables
    }

    /// Returns the most recent region, if a frame has been drawn.
    #[must_use]
    pub const fn region(&self) -> Option<Region> {
        self.region
    }

    /// Inserts a batch under the overflow policy.
    pub fn insert_batch(&mut self, batch: Vec<Primitive>) -> InsertOutcome {
        self.drawables.insert_batch(batch)
    }

    /// Records the region for this frame and freezes the set for drawing.
    pub fn observe(&mut self, region: Region) -> Snapshot {
        self.region = Some(region);
        self.drawables.snapshot()
    }

    /// Explicit reset: drops every primitive. The region is kept.
    pub fn reset(&mut self) {
        self.drawables.clear();
    }

    /// Wraps the scene for use from more than one thread.
    #[must_use]
    pub fn into_shared(self) -> SharedScene {
        SharedScene(Arc::new(Mutex::new(self)))
    }
}

/// Scene behind a lock, for hosts whose timers fire on separate threads.
///
/// Each operation holds the lock only for its own duration. Drawing happens
/// on a [`Snapshot`] outside the lock, so a slow frame never stalls the
/// mutation side and a clear can never land mid-iteration.
#[derive(Debug, Clone)]
pub struct SharedScene(Arc<Mutex<Scene>>);

impl SharedScene {
    /// Inserts a batch under the overflow policy.
    pub fn insert_batch(&self, batch: Vec<Primitive>) -> InsertOutcome {
        self.0.lock().insert_batch(batch)
    }

    /// Records the region and returns a snapshot to draw from.
    pub fn observe(&self, region: Region) -> Snapshot {
        self.0.lock().observe(region)
    }

    /// Takes a snapshot without touching the region.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.0.lock().drawables.snapshot()
    }

    /// Drops every primitive.
    pub fn reset(&self) {
        self.0.lock().reset();
    }

    /// Returns the most recent region.
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        self.0.lock().region()
    }

    /// Current population.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().drawables.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().drawables.is_empty()
    }

    /// Runs `f` with exclusive access to the scene.
    pub fn with<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        f(&mut self.0.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::primitive::Ball;
    use crate::style::Color;

    fn ball() -> Primitive {
        Primitive::Ball(Ball {
            center: Point::new(1.0, 1.0),
            radius: 1.0,
            color: Color::WHITE,
        })
    }

    #[test]
    fn test_observe_records_region() {
        let mut scene = Scene::new(10, 1);
        assert!(scene.region().is_none());

        let region = Region::from_size(320.0, 200.0);
        let snapshot = scene.observe(region);
        assert!(snapshot.is_empty());
        assert_eq!(scene.region(), Some(region));
    }

    #[test]
    fn test_shared_reset_keeps_region() {
        let shared = Scene::new(10, 1).into_shared();
        shared.observe(Region::from_size(10.0, 10.0));
        shared.insert_batch(vec![ball(), ball()]);
        assert_eq!(shared.len(), 2);

        let before = shared.snapshot();
        shared.reset();
        assert!(shared.is_empty());
        assert_eq!(before.len(), 2);
        assert!(shared.region().is_some());
    }

    #[test]
    fn test_shared_across_threads() {
        let shared = Scene::new(50, 5).into_shared();
        let writer = shared.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..100 {
                writer.insert_batch(vec![ball(); 5]);
            }
        });

        for _ in 0..100 {
            let snapshot = shared.snapshot();
            assert!(snapshot.len() <= 50);
            assert_eq!(snapshot.len() % 5, 0);
        }

        handle.join().unwrap();
        assert!(shared.len() <= 50);
    }
}
