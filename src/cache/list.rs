//! Recency List Module
//!
//! Doubly linked list used to track access order for LRU eviction.
//!
//! Nodes live in a slot arena and link to each other by index, so every
//! operation that is handed a [`NodeHandle`] runs in O(1):
//! - Front = Most recently used
//! - Back = Least recently used

// == Node Handle ==
/// Stable handle to a node in a [`RecencyList`].
///
/// A handle stays valid until its node is removed; the slot may then be
/// reused by a later `push_front`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Arena-backed doubly linked list ordered from most to least recently used.
#[derive(Debug)]
pub struct RecencyList<T> {
    /// Node storage, `None` marks a free slot
    slots: Vec<Option<Node<T>>>,
    /// Indices of free slots available for reuse
    free: Vec<usize>,
    /// Most recently used node
    first: Option<usize>,
    /// Least recently used node
    last: Option<usize>,
    len: usize,
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            first: None,
            last: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a value as the most recently used node.
    ///
    /// If the list was empty the new node is also the last one.
    pub fn push_front(&mut self, value: T) -> NodeHandle {
        let node = Node {
            value,
            prev: None,
            next: self.first,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.first {
            Some(old_first) => {
                if let Some(old) = self.node_mut(old_first) {
                    old.prev = Some(idx);
                }
            }
            None => self.last = Some(idx),
        }
        self.first = Some(idx);
        self.len += 1;

        NodeHandle(idx)
    }

    // == Move To Front ==
    /// Marks a node as most recently used.
    ///
    /// Unknown handles are ignored.
    pub fn move_to_front(&mut self, handle: NodeHandle) {
        if self.first == Some(handle.0) || self.node(handle.0).is_none() {
            return;
        }

        self.unlink(handle.0);

        let old_first = self.first;
        if let Some(node) = self.node_mut(handle.0) {
            node.prev = None;
            node.next = old_first;
        }
        match old_first {
            Some(old) => {
                if let Some(node) = self.node_mut(old) {
                    node.prev = Some(handle.0);
                }
            }
            None => self.last = Some(handle.0),
        }
        self.first = Some(handle.0);
    }

    // == Remove ==
    /// Unlinks a node from wherever it sits and returns its value.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        self.node(handle.0)?;
        self.unlink(handle.0);

        let node = self.slots[handle.0].take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(node.value)
    }

    // == Remove All ==
    /// Drops every node.
    ///
    /// Nodes are owned by the arena, so this is a flat walk and never
    /// recurses along the chain.
    pub fn remove_all(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    // == Accessors ==
    /// Returns the least recently used node without removing it.
    pub fn last(&self) -> Option<NodeHandle> {
        self.last.map(NodeHandle)
    }

    /// Returns the most recently used node.
    pub fn first(&self) -> Option<NodeHandle> {
        self.first.map(NodeHandle)
    }

    /// Borrows the value at `handle`, or `None` if the node was freed.
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.node(handle.0).map(|node| &node.value)
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no node is linked.
    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &T)> + '_ {
        let mut cursor = self.first;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let node = self.node(idx)?;
            cursor = node.next;
            Some((NodeHandle(idx), &node.value))
        })
    }

    // == Internal Helpers ==
    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Detaches a node, patching its neighbours and the list ends.
    /// The node's own links are cleared.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node_mut(idx) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.first = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.last = prev,
        }
    }

    /// Walks the chain in both directions and panics on any broken link.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.first.is_none(), self.last.is_none());

        let mut forward = 0;
        let mut prev = None;
        let mut cursor = self.first;
        while let Some(idx) = cursor {
            let node = self.node(idx).expect("dangling next link");
            assert_eq!(node.prev, prev, "broken prev link at {}", idx);
            prev = Some(idx);
            cursor = node.next;
            forward += 1;
        }
        assert_eq!(prev, self.last, "walk did not end at last");
        assert_eq!(forward, self.len);

        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len);
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}
