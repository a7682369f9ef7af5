//! A linked list that flattens all its nodes onto a Vec for storage, gaining
//! data locality and O(1) removal of any node by handle.

/// Alias for the index of a node in the linked list's storage vec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeHandle(usize);

/// A node that lives in a linked list.
#[derive(Clone)]
struct Node<T> {
    /// The value being stored.
    value: T,

    /// The node previous to this one, or `None` at the head.
    prev: Option<NodeHandle>,

    /// The next node in the list, or `None` at the tail.
    next: Option<NodeHandle>,
}

/// A doubly linked list living in a single contiguous Vec of slots, which are
/// addressed by their position in the Vec. Removing a node vacates its slot and
/// freelists it; the next push reuses it. Order is defined by the links alone,
/// so a reused slot in the middle of the Vec still lands at the back of the
/// list.
///
/// Handles are leaked out of the list on purpose: OrderedMap keeps one per key
/// in its index so that lookup and unlinking are both O(1).
#[derive(Clone)]
pub(crate) struct LinkedList<T> {
    /// The slots in the list. `None` marks a vacated slot.
    store: Vec<Option<Node<T>>>,

    /// Slots in the list which aren't in use anymore. These will be reused.
    free: Vec<NodeHandle>,

    /// The first (oldest) node in the list.
    head: Option<NodeHandle>,

    /// The last (newest) node in the list.
    tail: Option<NodeHandle>,
}

impl<T> LinkedList<T> {
    /// Creates a new linked list with a specific capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// The length of this linked list.
    pub(crate) fn len(&self) -> usize {
        self.store.len() - self.free.len()
    }

    /// The number of slots the storage vec can hold without reallocating.
    pub(crate) fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// The number of vacated slots waiting to be reused.
    pub(crate) fn vacant(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn head(&self) -> Option<NodeHandle> {
        self.head
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> Option<NodeHandle> {
        self.tail
    }

    /// The node linked after `node`.
    pub(crate) fn next(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.node(node).and_then(|n| n.next)
    }

    /// Gets an element from the list.
    pub(crate) fn get(&self, node: NodeHandle) -> Option<&T> {
        self.node(node).map(|n| &n.value)
    }

    pub(crate) fn get_mut(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.node_mut(node).map(|n| &mut n.value)
    }

    /// Pushes t onto the back of the list and returns a handle to the node.
    pub(crate) fn push_back(&mut self, t: T) -> NodeHandle {
        let n = Node {
            value: t,
            prev: self.tail,
            next: None,
        };

        // use the first available location in the storage vec, or append a
        // new slot if nothing has been freelisted.
        let idx = match self.free.pop() {
            Some(idx) => {
                self.store[idx.0] = Some(n);
                idx
            }
            None => {
                self.store.push(Some(n));
                NodeHandle(self.store.len() - 1)
            }
        };

        match self.tail.and_then(|tail| self.node_mut(tail)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }

        self.tail = Some(idx);

        idx
    }

    /// Pops the front node off the list if it exists.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        self.remove(head)
    }

    /// Pops the back node off the list if it exists.
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Remove an arbitrary node from the list. The nodes on either side are
    /// linked to each other, so the relative order of everything else is
    /// untouched.
    pub(crate) fn remove(&mut self, node: NodeHandle) -> Option<T> {
        let removed = self.store.get_mut(node.0)?.take()?;

        match removed.prev.and_then(|prev| self.node_mut(prev)) {
            Some(prev) => prev.next = removed.next,
            None => self.head = removed.next,
        }

        match removed.next.and_then(|next| self.node_mut(next)) {
            Some(next) => next.prev = removed.prev,
            None => self.tail = removed.prev,
        }

        // the slot gets overwritten at some later push
        self.free.push(node);

        Some(removed.value)
    }

    /// Clears this linked list. Does not free the underlying buffers.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    fn node(&self, node: NodeHandle) -> Option<&Node<T>> {
        self.store.get(node.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, node: NodeHandle) -> Option<&mut Node<T>> {
        self.store.get_mut(node.0).and_then(Option::as_mut)
    }
}

/// Walks the list from head to tail, or from tail to head when reversed.
pub(crate) struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    front: Option<NodeHandle>,
    back: Option<NodeHandle>,
    remaining: usize,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.list.node(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.list.node(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

/// Drains the list by value, front to back.
pub(crate) struct IntoIter<T>(LinkedList<T>);

impl<T> IntoIterator for LinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
