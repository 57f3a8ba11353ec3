//! Per-search scratch space recording which nodes a traversal has already scored.
//!
//! Slots hold the epoch of the search that last marked them, so starting a new
//! search is a counter bump rather than a pass over every slot.

/// Visited-node tracker indexed by node id.
#[derive(Debug, Default)]
pub struct VisitedSet {
    marks: Vec<u16>,
    epoch: u16,
    marked: usize,
}

impl VisitedSet {
    /// Scratch space sized for `node_count` nodes, ready for a first search.
    pub fn new(node_count: usize) -> Self {
        let mut set = Self::default();
        set.reset(node_count);
        set
    }

    /// Start a new search over a graph of `node_count` nodes.
    ///
    /// Grows the slot array when the graph has grown since the last search and
    /// forgets every previous mark. Slots are only rewritten when the epoch wraps.
    pub fn reset(&mut self, node_count: usize) {
        if node_count > self.marks.len() {
            self.marks.resize(node_count, 0);
        }
        self.marked = 0;
        self.epoch = match self.epoch.checked_add(1) {
            Some(next) => next,
            None => {
                self.marks.fill(0);
                1
            }
        };
    }

    /// Mark `id`. Returns `true` the first time `id` is seen in this search.
    #[inline]
    pub fn mark(&mut self, id: u32) -> bool {
        let slot = &mut self.marks[id as usize];
        if *slot == self.epoch {
            return false;
        }
        *slot = self.epoch;
        self.marked += 1;
        true
    }

    #[inline]
    pub fn is_marked(&self, id: u32) -> bool {
        self.marks[id as usize] == self.epoch
    }

    /// Number of distinct nodes marked since the last reset.
    pub fn marked(&self) -> usize {
        self.marked
    }

    pub fn capacity(&self) -> usize {
        self.marks.len()
    }
}
