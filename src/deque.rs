//! Deque with O(1) removal of arbitrary elements
//!
//! Nodes live in an arena owned by the deque. Insertion hands out a
//! [`NodeHandle`] (slot index plus generation) which can later remove that
//! exact element in constant time, wherever it sits. A handle whose element
//! has already been removed or polled resolves to nothing, so removing it
//! again is a harmless no-op.
//!
//! Not thread safe: callers serialize access themselves.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DEQUE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one element inserted into a [`LinkedDeque`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    deque: u64,
    index: usize,
    generation: u64,
}

struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// Doubly-linked deque over an index arena
///
/// # Examples
///
/// ```
/// use async_objectpool::LinkedDeque;
///
/// let mut deque = LinkedDeque::new();
/// deque.add_last("a");
/// let b = deque.add_last("b");
/// deque.add_last("c");
///
/// assert_eq!(deque.remove(b), Some("b"));
/// assert_eq!(deque.remove(b), None);
/// assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec!["a", "c"]);
/// ```
pub struct LinkedDeque<T> {
    id: u64,
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for LinkedDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedDeque<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_DEQUE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert at the head
    pub fn add_first(&mut self, value: T) -> NodeHandle {
        let next = self.head;
        let index = self.allocate(Node {
            value,
            prev: None,
            next,
        });
        match next {
            Some(n) => self.node_mut(n).prev = Some(index),
            None => self.tail = Some(index),
        }
        self.head = Some(index);
        self.handle(index)
    }

    /// Insert at the tail
    pub fn add_last(&mut self, value: T) -> NodeHandle {
        let prev = self.tail;
        let index = self.allocate(Node {
            value,
            prev,
            next: None,
        });
        match prev {
            Some(p) => self.node_mut(p).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.handle(index)
    }

    /// Insert immediately before the element identified by `before`
    ///
    /// Returns `None`, leaving the deque untouched, if `before` is no longer
    /// linked.
    ///
    /// # Panics
    ///
    /// Panics if `before` was issued by a different deque.
    pub fn add_before(&mut self, before: NodeHandle, value: T) -> Option<NodeHandle> {
        let successor = self.resolve(before)?;
        let prev = self.node(successor).prev;
        let index = self.allocate(Node {
            value,
            prev,
            next: Some(successor),
        });
        self.node_mut(successor).prev = Some(index);
        match prev {
            Some(p) => self.node_mut(p).next = Some(index),
            None => self.head = Some(index),
        }
        Some(self.handle(index))
    }

    /// Remove the element identified by `handle`
    ///
    /// Returns `None` if the element was already removed or polled.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was issued by a different deque.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let index = self.resolve(handle)?;
        Some(self.unlink(index))
    }

    /// Whether the element identified by `handle` is still linked
    pub fn contains(&self, handle: NodeHandle) -> bool {
        handle.deque == self.id && self.lookup(handle).is_some()
    }

    pub fn poll_first(&mut self) -> Option<T> {
        let index = self.head?;
        Some(self.unlink(index))
    }

    pub fn poll_last(&mut self) -> Option<T> {
        let index = self.tail?;
        Some(self.unlink(index))
    }

    pub fn peek_first(&self) -> Option<&T> {
        self.head.map(|i| &self.node(i).value)
    }

    pub fn peek_last(&self) -> Option<&T> {
        self.tail.map(|i| &self.node(i).value)
    }

    /// Iterate from head to tail. Use `.rev()` for tail to head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            deque: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn handle(&self, index: usize) -> NodeHandle {
        NodeHandle {
            deque: self.id,
            index,
            generation: self.slots[index].generation,
        }
    }

    fn lookup(&self, handle: NodeHandle) -> Option<usize> {
        let slot = self.slots.get(handle.index)?;
        (slot.generation == handle.generation && slot.node.is_some()).then_some(handle.index)
    }

    fn resolve(&self, handle: NodeHandle) -> Option<usize> {
        assert_eq!(
            handle.deque, self.id,
            "node handle belongs to a different deque"
        );
        self.lookup(handle)
    }

    fn node(&self, index: usize) -> &Node<T> {
        match &self.slots[index].node {
            Some(node) => node,
            None => unreachable!("linked index {index} points at a vacant slot"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        match &mut self.slots[index].node {
            Some(node) => node,
            None => unreachable!("linked index {index} points at a vacant slot"),
        }
    }

    fn allocate(&mut self, node: Node<T>) -> usize {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, index: usize) -> T {
        let slot = &mut self.slots[index];
        let Some(node) = slot.node.take() else {
            unreachable!("unlinking vacant slot {index}");
        };
        // Stale handles to this slot stop resolving from here on.
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;

        match node.prev {
            Some(p) => self.node_mut(p).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.node_mut(n).prev = node.prev,
            None => self.tail = node.prev,
        }
        node.value
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for LinkedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T> Extend<T> for LinkedDeque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add_last(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a LinkedDeque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`LinkedDeque`]
pub struct Iter<'a, T> {
    deque: &'a LinkedDeque<T>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.deque.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.deque.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
