//! Generic concurrent key/value store.
//!
//! Backed by a sharded [`DashMap`], so single-key operations never need an
//! external lock. There are no cross-key transactions: `restore` applies keys
//! one at a time and concurrent readers may observe a partial restore.

use std::collections::HashMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hive_core::is_blank_key;

/// Concurrent store of `T` values keyed by string.
///
/// Values are returned by clone. Keep `T` cheap to clone (or wrap it in an
/// `Arc`) for large payloads.
#[derive(Debug)]
pub struct Cache<T> {
    entries: DashMap<String, T>,
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> Cache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a single key. Absence is a normal outcome, not an error.
    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Snapshot every entry, together with the number of entries returned.
    ///
    /// Shards are read one after another, so a write racing with this call
    /// may or may not be reflected.
    pub fn get_all(&self) -> (HashMap<String, T>, usize) {
        let snapshot: HashMap<String, T> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let count = snapshot.len();
        (snapshot, count)
    }

    /// Store `value` under `key`, overwriting any previous value.
    pub fn set(&self, key: impl Into<String>, value: T) -> bool {
        self.entries.insert(key.into(), value);
        true
    }

    /// Remove `key`. Deleting an absent key still succeeds.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key);
        true
    }

    /// Insert only when `key` is absent. Returns false when it already exists.
    pub fn insert_new(&self, key: impl Into<String>, value: T) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                true
            }
        }
    }

    /// Replace the value of an existing key. Returns false when `key` is absent.
    pub fn replace(&self, key: &str, value: T) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                *entry = value;
                true
            }
            None => false,
        }
    }

    /// Mutate the value under `key` in place while holding its shard lock.
    ///
    /// Returns `None` when `key` is absent. `f` must not touch this cache.
    pub fn update<R, F>(&self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.entries.get_mut(key).map(|mut entry| f(entry.value_mut()))
    }

    /// Remove `key` and hand back its value, if any.
    pub fn take(&self, key: &str) -> Option<T> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Bulk upsert. Blank keys are skipped; returns how many keys were applied.
    pub fn restore<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let mut applied = 0;
        for (key, value) in items {
            if is_blank_key(&key) {
                continue;
            }
            if self.set(key, value) {
                applied += 1;
            }
        }
        applied
    }

    /// First entry whose value satisfies `predicate`, in no particular order.
    pub fn find<F>(&self, predicate: F) -> Option<(String, T)>
    where
        F: Fn(&T) -> bool,
    {
        self.entries
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys currently stored, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
