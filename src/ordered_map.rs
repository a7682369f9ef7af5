use std::{
    borrow::Borrow,
    collections::{hash_map::RandomState, HashMap},
    fmt,
    hash::{BuildHasher, Hash},
    ops::Index,
};

use crate::linked_list::{self, LinkedList, NodeHandle};

/// A layer on top of [`HashMap`] that links entries together so they can be
/// iterated over in the order their keys were first inserted.
///
/// The hash map only holds a handle into a Vec-backed linked list, which in
/// turn holds the key and value. Setting a key that is already present
/// overwrites the value in place and leaves its position alone. Removing a key
/// unlinks its node, so everything else keeps its relative order.
///
/// Iterators borrow the map, so it cannot be mutated while an iteration is in
/// progress.
#[derive(Clone)]
pub struct OrderedMap<K, V, S = RandomState> {
    index: HashMap<K, NodeHandle, S>,
    entries: LinkedList<(K, V)>,
}

impl<K, V> OrderedMap<K, V, RandomState> {
    /// Makes a new, empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Makes a new map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, hash_builder),
            entries: LinkedList::with_capacity(capacity),
        }
    }

    /// The number of entries in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of entries the map can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.index.capacity().min(self.entries.capacity())
    }

    pub fn hasher(&self) -> &S {
        self.index.hasher()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter(self.entries.iter())
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.entries.iter())
    }

    /// Iterates over the values in the insertion order of their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.entries.iter())
    }

    /// The oldest entry in the map.
    pub fn front(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// The newest entry in the map.
    pub fn back(&self) -> Option<(&K, &V)> {
        self.iter().next_back()
    }

    /// Removes every entry. Keeps the allocated memory for reuse.
    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Sets the value at a key, returning the previous value if the key was
    /// already present. A new key goes to the back of the map; an existing
    /// key keeps its position.
    pub fn set(&mut self, k: K, v: V) -> Option<V> {
        let previous = match self.index.get(&k) {
            Some(&node) => self
                .entries
                .get_mut(node)
                .map(|(_, value)| std::mem::replace(value, v)),
            None => {
                let node = self.entries.push_back((k.clone(), v));
                self.index.insert(k, node);
                None
            }
        };

        #[cfg(test)]
        self.continuity_test();

        previous
    }

    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(k).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, k: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = *self.index.get(k)?;
        self.entries.get(node).map(|(k, v)| (k, v))
    }

    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = *self.index.get(k)?;
        self.entries.get_mut(node).map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(k)
    }

    /// Removes a key, returning whether it was present.
    pub fn delete<Q>(&mut self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(k).is_some()
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove<Q>(&mut self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(k).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, k: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let node = self.index.remove(k)?;
        let removed = self.entries.remove(node);

        #[cfg(test)]
        self.continuity_test();

        removed
    }

    /// Removes and returns the oldest entry.
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let (k, v) = self.entries.pop_front()?;
        self.index.remove(&k);
        Some((k, v))
    }

    /// Removes and returns the newest entry.
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let (k, v) = self.entries.pop_back()?;
        self.index.remove(&k);
        Some((k, v))
    }

    /// Keeps only the entries for which `f` returns true, visiting them in
    /// insertion order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.entries.head();

        while let Some(node) = cursor {
            // grab the next link before this node can be unlinked
            cursor = self.entries.next(node);

            let keep = match self.entries.get_mut(node) {
                Some((k, v)) => f(&*k, v),
                None => true,
            };

            if !keep {
                if let Some((k, _)) = self.entries.remove(node) {
                    self.index.remove(&k);
                }
            }
        }

        #[cfg(test)]
        self.continuity_test();
    }

    /// Drops the slots left behind by removed entries and shrinks both
    /// structures as much as possible. Order is preserved.
    pub fn shrink_to_fit(&mut self) {
        if self.entries.vacant() > 0 || self.entries.capacity() > self.entries.len() {
            let old = std::mem::replace(
                &mut self.entries,
                LinkedList::with_capacity(self.index.len()),
            );

            // every entry lands in a new slot, so its handle has to be
            // repointed
            for entry in old {
                let node = self.entries.push_back(entry);
                if let Some((k, _)) = self.entries.get(node) {
                    if let Some(handle) = self.index.get_mut(k) {
                        *handle = node;
                    }
                }
            }
        }

        self.index.shrink_to_fit();

        #[cfg(test)]
        self.continuity_test();
    }

    #[cfg(test)]
    fn continuity_test(&self) {
        // iterate through the list and make sure it matches the number of
        // elements in the index, and that every key resolves to its own node
        let mut count = 0;

        for (k, _) in self.entries.iter() {
            count += 1;
            assert!(count <= self.index.len());
            let node = self.index[k];
            assert!(self.entries.get(node).map_or(false, |(nk, _)| nk == k));
        }

        assert_eq!(self.index.len(), count);

        // and the same walking backwards
        assert_eq!(self.index.len(), self.entries.iter().rev().count());
    }
}

impl<K, V, S> Default for OrderedMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when they hold the same entries in the same order.
impl<K, V, S1, S2> PartialEq<OrderedMap<K, V, S2>> for OrderedMap<K, V, S1>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &OrderedMap<K, V, S2>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, S> Eq for OrderedMap<K, V, S>
where
    K: Eq,
    V: Eq,
{
}

impl<K, Q, V, S> Index<&Q> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone + Borrow<Q>,
    Q: Eq + Hash + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not present in OrderedMap"),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for OrderedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_iter())
    }
}

/// Entries of an [`OrderedMap`] in insertion order.
pub struct Iter<'a, K, V>(linked_list::Iter<'a, (K, V)>);

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, v)| (k, v))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// Keys of an [`OrderedMap`] in insertion order.
pub struct Keys<'a, K, V>(linked_list::Iter<'a, (K, V)>);

impl<'a, K, V> Clone for Keys<'a, K, V> {
    fn clone(&self) -> Self {
        Keys(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// Values of an [`OrderedMap`] in the insertion order of their keys.
pub struct Values<'a, K, V>(linked_list::Iter<'a, (K, V)>);

impl<'a, K, V> Clone for Values<'a, K, V> {
    fn clone(&self) -> Self {
        Values(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// Owned entries of an [`OrderedMap`] in insertion order.
pub struct IntoIter<K, V>(linked_list::IntoIter<(K, V)>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
