//! Bounded window of recent readings.

use std::collections::VecDeque;

use parking_lot::RwLock;

use super::Reading;

/// Default number of readings retained.
pub const DEFAULT_CAPACITY: usize = 100;

/// A fixed-capacity, insertion-ordered window of readings.
///
/// The ingestion task is the only writer; the renderer and the query
/// facade read point-in-time copies via [`History::snapshot`]. Both
/// operations take the lock for a short, bounded critical section, so a
/// snapshot observes either the pre- or post-append state of a
/// concurrent append, never a partial one. The live deque is never
/// handed out.
#[derive(Debug)]
pub struct History {
    readings: RwLock<VecDeque<Reading>>,
    capacity: usize,
}

impl History {
    /// Create an empty history that retains at most `capacity` readings.
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a reading, evicting from the front once full.
    ///
    /// Strict sliding window: the oldest reading goes first, order is
    /// always arrival order.
    pub fn append(&self, reading: Reading) {
        let mut readings = self.readings.write();
        readings.push_back(reading);
        while readings.len() > self.capacity {
            readings.pop_front();
        }
    }

    /// Copy the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.readings.read().iter().copied().collect()
    }

    /// Number of readings currently retained.
    pub fn len(&self) -> usize {
        self.readings.read().len()
    }

    /// True if no readings have been retained.
    pub fn is_empty(&self) -> bool {
        self.readings.read().is_empty()
    }

    /// Maximum number of readings retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
