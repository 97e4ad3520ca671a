use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{Result, StoreError};

/// Keyed store with at-most-one-writer-per-key semantics.
///
/// The map's shard lock is held only while an entry is found or created.
/// Work on a value holds that key's mutex and nothing else, so writers on
/// distinct keys never wait on each other. Closures passed to
/// [`KeyedStore::merge`] must not call back into the same store key.
pub struct KeyedStore<K, V>
where
    K: Eq + Hash,
{
    entries: Arc<DashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> Clone for KeyedStore<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Insert a value if the key is absent. Existing values are never overwritten.
    pub fn put(&self, key: K, value: V) -> Result<()> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(StoreError::KeyExists),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(value)));
                Ok(())
            }
        }
    }

    /// Snapshot of the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.slot(key).map(|slot| slot.lock().clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Run `f` on the value under `key` while holding that key's lock.
    pub fn merge<R, F>(&self, key: &K, f: F) -> Result<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let slot = self.slot(key).ok_or(StoreError::KeyNotFound)?;
        let mut value = slot.lock();
        Ok(f(&mut value))
    }

    /// Like [`KeyedStore::merge`], creating the value with `init` when absent.
    pub fn merge_or_insert_with<R, I, F>(&self, key: K, init: I, f: F) -> R
    where
        I: FnOnce() -> V,
        F: FnOnce(&mut V) -> R,
    {
        let slot = {
            let entry = self
                .entries
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(init())));
            Arc::clone(entry.value())
        };
        let mut value = slot.lock();
        f(&mut value)
    }

    /// Explicit removal. Nothing is ever evicted implicitly.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries
            .remove(key)
            .map(|(_, slot)| slot.lock().clone())
    }

    /// Remove every entry for which `predicate` returns true; returns the count.
    pub fn remove_where<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<K> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.key(), &entry.value().lock()))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0usize;
        for key in doomed {
            if self.entries.remove(&key).is_some() {
                removed = removed.saturating_add(1);
            }
        }
        tracing::debug!(removed, "Removed store entries");
        removed
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }
}
