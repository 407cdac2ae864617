//! Priority queue for the merged iterator.
//!
//! A binary min-heap stored in a `Vec` (`parent = (i - 1) / 2`, children
//! `2i + 1` and `2i + 2`). Entries order by key; on equal keys the entry from
//! the higher stack index comes first, so the newest table's record for a key
//! is always the one dequeued first and the rest can be dropped as shadowed.

use record::Record;
use std::fmt;

/// One pending record pulled from the sub-iterator at `index`.
pub(crate) struct PqEntry {
    /// Cached `rec.key()`; compared on every heap step.
    pub key: Vec<u8>,
    pub rec: Record,
    pub index: usize,
}

impl PqEntry {
    pub fn new(rec: Record, index: usize) -> Self {
        Self {
            key: rec.key(),
            rec,
            index,
        }
    }
}

impl fmt::Debug for PqEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", String::from_utf8_lossy(&self.key), self.index)
    }
}

/// Heap order: smaller key first, then higher stack index first.
pub(crate) fn pq_less(a: &PqEntry, b: &PqEntry) -> bool {
    if a.key == b.key {
        return a.index > b.index;
    }
    a.key < b.key
}

#[derive(Debug, Default)]
pub(crate) struct MergedIterPQueue {
    heap: Vec<PqEntry>,
}

impl MergedIterPQueue {
    /// The minimum entry, without removing it.
    pub fn top(&self) -> Option<&PqEntry> {
        self.heap.first()
    }

    pub fn add(&mut self, e: PqEntry) {
        self.heap.push(e);
        let mut i = self.heap.len() - 1;
        while i > 0 {
            let j = (i - 1) / 2;
            if pq_less(&self.heap[j], &self.heap[i]) {
                break;
            }
            self.heap.swap(i, j);
            i = j;
        }
    }

    /// Removes and returns the minimum entry.
    pub fn remove(&mut self) -> Option<PqEntry> {
        if self.heap.is_empty() {
            return None;
        }
        let e = self.heap.swap_remove(0);

        let n = self.heap.len();
        let mut i = 0;
        loop {
            let mut min = i;
            let (j, k) = (2 * i + 1, 2 * i + 2);
            if j < n && pq_less(&self.heap[j], &self.heap[min]) {
                min = j;
            }
            if k < n && pq_less(&self.heap[k], &self.heap[min]) {
                min = k;
            }
            if min == i {
                break;
            }
            self.heap.swap(i, min);
            i = min;
        }
        Some(e)
    }

    /// Asserts that no child orders before its parent.
    ///
    /// # Panics
    ///
    /// Panics on a violation; that is a bug in this module, never the result
    /// of table contents.
    pub fn check(&self) {
        for i in 1..self.heap.len() {
            let parent = (i - 1) / 2;
            assert!(
                !pq_less(&self.heap[i], &self.heap[parent]),
                "heap invariant violated at {i}: parent {:?}, child {:?}",
                self.heap[parent],
                self.heap[i]
            );
        }
    }
}
