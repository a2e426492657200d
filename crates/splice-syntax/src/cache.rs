//! Thread-safe memoisation keyed by value.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

/// One key's slot; `None` until a computation has succeeded.
type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Memoises expensive per-key computations such as per-file parses.
///
/// Concurrent callers asking for the same key share one computation: the
/// first caller computes while holding that key's slot, later callers block
/// on the slot and receive the stored value. Different keys never block each
/// other beyond a brief map lookup. A failed computation stores nothing, so
/// the next caller retries.
///
/// # Thread Safety
///
/// `MemoCache` is `Sync` whenever `K` and `V` are `Send + Sync`, and can be
/// shared across threads behind a reference or an `Arc`.
pub struct MemoCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the value for `key`, computing it with `compute` on a miss.
    #[must_use]
    pub fn get_or_compute(&self, key: &K, compute: impl FnOnce() -> V) -> Arc<V> {
        let slot = self.slot(key);
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(value.get_or_insert_with(|| Arc::new(compute())))
    }

    /// Returns the value for `key`, computing it with `compute` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error from `compute`; nothing is cached in that case.
    pub fn try_get_or_compute<E>(
        &self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = self.slot(key);
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = value.as_ref() {
            return Ok(Arc::clone(cached));
        }
        let computed = Arc::new(compute()?);
        *value = Some(Arc::clone(&computed));
        Ok(computed)
    }

    /// Returns the cached value for `key` without computing it.
    ///
    /// Blocks while another caller is computing the same key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;
        let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        value.clone()
    }

    /// Returns the number of keys with a slot, computed or in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns whether the cache has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached value.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
