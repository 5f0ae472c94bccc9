//! Tracks the newest graded attempt per (room, user).
//!
//! Beginning an attempt bumps a generation counter for its key. Tokens of
//! older generations report themselves stale, which is how an in-flight
//! suite learns to stop writing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Key = (String, i64);

#[derive(Clone, Default)]
pub struct AttemptRegistry {
    current: Arc<Mutex<HashMap<Key, u64>>>,
    next_generation: Arc<AtomicU64>,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new attempt, superseding any earlier one for the same key.
    pub fn begin(&self, room_code: &str, user_id: i64) -> AttemptToken {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let key = (room_code.to_owned(), user_id);
        self.lock().insert(key.clone(), generation);
        AttemptToken {
            registry: self.clone(),
            key,
            generation,
        }
    }

    fn is_current(&self, key: &Key, generation: u64) -> bool {
        self.lock().get(key) == Some(&generation)
    }

    fn release(&self, key: &Key, generation: u64) {
        let mut current = self.lock();
        if current.get(key) == Some(&generation) {
            current.remove(key);
        }
    }

    pub fn active_attempts(&self) -> usize {
        self.lock().len()
    }

    /// Recovers from poison. Every write is a single insert or remove.
    fn lock(&self) -> MutexGuard<'_, HashMap<Key, u64>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle for one attempt. Dropping it releases the slot if still current.
pub struct AttemptToken {
    registry: AttemptRegistry,
    key: Key,
    generation: u64,
}

impl AttemptToken {
    pub fn is_current(&self) -> bool {
        self.registry.is_current(&self.key, self.generation)
    }
}

impl Drop for AttemptToken {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.generation);
    }
}
