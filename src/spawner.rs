/// Counter-driven periodic triggers.
///
/// `Cadence` is the bare counter (also used for snake steps and tetris
/// gravity); `Spawner` pairs one with a table that builds the new entity.

use rand::Rng;

use crate::collision::Rect;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cadence {
    threshold: u32,
    counter: u32,
}

impl Cadence {
    /// A threshold of zero is treated as one (fire every tick).
    pub fn new(threshold: u32) -> Self {
        Cadence {
            threshold: threshold.max(1),
            counter: 0,
        }
    }

    /// Count one tick.  Returns `true` on the tick the counter reaches the
    /// threshold, and starts counting again from zero.
    pub fn advance(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.threshold {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Change the period without losing progress towards the next trigger.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold.max(1);
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}

/// Builds one randomized entity when a spawner fires.
pub trait SpawnTable {
    type Output;

    fn spawn<R: Rng>(&self, field: &Rect, rng: &mut R) -> Self::Output;
}

#[derive(Clone, Debug)]
pub struct Spawner<T> {
    cadence: Cadence,
    table: T,
    spawned: u64,
}

impl<T: SpawnTable> Spawner<T> {
    pub fn new(threshold: u32, table: T) -> Self {
        Spawner {
            cadence: Cadence::new(threshold),
            table,
            spawned: 0,
        }
    }

    /// Advance one tick; yields a new entity every `threshold` ticks.
    pub fn tick<R: Rng>(&mut self, field: &Rect, rng: &mut R) -> Option<T::Output> {
        if !self.cadence.advance() {
            return None;
        }
        self.spawned += 1;
        Some(self.table.spawn(field, rng))
    }

    pub fn reset(&mut self) {
        self.cadence.reset();
        self.spawned = 0;
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        self.cadence.set_threshold(threshold);
    }

    pub fn threshold(&self) -> u32 {
        self.cadence.threshold()
    }

    /// Entities created since the last reset.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut T {
        &mut self.table
    }
}
