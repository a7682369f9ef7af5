use parking_lot::RwLock;
use serde::Serialize;
use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hash},
    sync::Arc,
};

use crate::{error::Result, key::KeyText, ordered_map::OrderedMap};

/// Wrapper for an OrderedMap which is shareable across thread boundaries.
/// Clones are cheap and all point at the same map.
pub struct SharedOrderedMap<K, V, S = RandomState>(Arc<RwLock<OrderedMap<K, V, S>>>);

impl<K, V> SharedOrderedMap<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_map(OrderedMap::new())
    }
}

impl<K, V, S> SharedOrderedMap<K, V, S> {
    /// Wraps a map into a shared accessor, making it safe to move across
    /// thread boundaries.
    pub fn with_map(map: OrderedMap<K, V, S>) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    /// The number of entries in the map at present.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Clears the map.
    pub fn clear(&self) {
        self.0.write().clear()
    }

    /// Runs `f` against the map while holding the read lock. Use this to
    /// iterate; writers wait until `f` returns.
    pub fn read<R>(&self, f: impl FnOnce(&OrderedMap<K, V, S>) -> R) -> R {
        f(&*self.0.read())
    }

    /// Runs `f` against the map while holding the write lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut OrderedMap<K, V, S>) -> R) -> R {
        f(&mut *self.0.write())
    }

    /// Encodes a snapshot of the map as a compact JSON object.
    pub fn to_vec(&self) -> Result<Vec<u8>>
    where
        K: KeyText,
        V: Serialize,
    {
        let map = self.0.read();
        crate::ser::to_vec(&*map)
    }
}

impl<K, V, S> SharedOrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Sets a value in the map, returning the previous value at that key.
    pub fn set(&self, k: K, v: V) -> Option<V> {
        self.0.write().set(k, v)
    }

    /// Get a value from the map. This clones it to minimize the lock time of
    /// the map.
    pub fn get<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.0.read().get(k).cloned()
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.read().contains_key(k)
    }

    /// Removes a key, returning whether it was present.
    pub fn delete<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.write().delete(k)
    }

    /// Remove a key from the map, returning its value if it existed.
    pub fn remove<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.write().remove(k)
    }

    /// A snapshot of the keys in insertion order.
    pub fn keys(&self) -> Vec<K> {
        self.0.read().keys().cloned().collect()
    }
}

impl<K, V, S> Clone for SharedOrderedMap<K, V, S> {
    fn clone(&self) -> Self {
        SharedOrderedMap(self.0.clone())
    }
}

impl<K, V, S> Default for SharedOrderedMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_map(OrderedMap::default())
    }
}

impl<K, V, S> From<OrderedMap<K, V, S>> for SharedOrderedMap<K, V, S> {
    fn from(map: OrderedMap<K, V, S>) -> Self {
        Self::with_map(map)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::SharedOrderedMap;

    #[test]
    fn test_shared_across_threads() {
        let map: SharedOrderedMap<usize, usize> = SharedOrderedMap::new();
        map.set(1, 1);

        let thread_map = map.clone();
        let r = thread::spawn(move || {
            thread_map.set(2, 2);
            thread_map.get(&1)
        })
        .join();

        assert_eq!(Some(1), r.unwrap());
        assert_eq!(vec![1, 2], map.keys());
    }

    #[test]
    fn test_writers_keep_insertion_order() {
        let map: SharedOrderedMap<usize, usize> = SharedOrderedMap::new();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let map = map.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        map.set(t * 100 + i, i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(100, map.len());

        // every thread's own keys were set in increasing order
        map.read(|inner| {
            for t in 0..4 {
                let own: Vec<_> = inner.keys().filter(|k| **k / 100 == t).collect();
                assert!(own.windows(2).all(|w| w[0] < w[1]));
            }
        });
    }

    #[test]
    fn test_snapshot_to_json() {
        let map = SharedOrderedMap::new();
        map.set(String::from("b"), true);
        map.set(String::from("a"), false);
        assert!(map.delete("b"));
        map.write(|inner| inner.set(String::from("c"), true));

        assert_eq!(br#"{"a":false,"c":true}"#.to_vec(), map.to_vec().unwrap());
        assert!(map.contains_key("a"));
        assert_eq!(Some(false), map.remove("a"));
        assert!(!map.is_empty());

        map.clear();
        assert!(map.is_empty());
    }
}
