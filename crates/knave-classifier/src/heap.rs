// crates/knave-classifier/src/heap.rs

//! Lazy ordered extraction over `(abstract distance, label)` pairs.
//!
//! Distances are only partially ordered; the heap places them under the
//! total lexicographic order on `(lower, upper)`, a tie-breaking extension
//! of the strict dominance relation. That order merely bounds the search —
//! soundness comes from the explicit dominance checks in the bounds
//! computation, never from heap placement.
//!
//! Extraction is cached: `nth_smallest(n)` draws elements until `n` are out
//! and is O(1) for anything already drawn.

use knave_core::Label;
use knave_domains::AbstractValue;

/// Heap placement order: lexicographic on `(lower, upper)`.
#[inline]
fn heap_lt<V: AbstractValue>(a: &V, b: &V) -> bool {
    a.lower() < b.lower() || (a.lower() == b.lower() && a.upper() < b.upper())
}

/// Min-heap with a cached extraction prefix.
#[derive(Debug)]
pub struct ExtractionHeap<V> {
    /// Remaining entries, kept in binary-heap order.
    pending: Vec<(V, Label)>,
    /// Already-extracted entries, ascending in the heap order.
    drawn: Vec<(V, Label)>,
}

impl<V: AbstractValue> ExtractionHeap<V> {
    /// Build a heap over the given entries in O(n).
    #[must_use]
    pub fn new(entries: Vec<(V, Label)>) -> Self {
        let mut h = Self {
            pending: entries,
            drawn: Vec::new(),
        };
        let n = h.pending.len();
        for i in (0..n / 2).rev() {
            h.sift_down(i);
        }
        h
    }

    /// Total number of entries, drawn or not.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.drawn.len()
    }

    /// Whether the heap holds no entries at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `n`-th smallest entry (1-based) under the heap order, or `None`
    /// if fewer than `n` entries exist. Already-drawn ranks are O(1).
    pub fn nth_smallest(&mut self, n: usize) -> Option<&(V, Label)> {
        if n == 0 || n > self.len() {
            return None;
        }
        while self.drawn.len() < n {
            self.draw_next();
        }
        Some(&self.drawn[n - 1])
    }

    /// Remove and return the current minimum.
    ///
    /// Cached entries are consumed first, so after `nth_smallest` queries the
    /// ranks of the remaining entries shift down by one per `pop`.
    pub fn pop(&mut self) -> Option<(V, Label)> {
        if self.drawn.is_empty() {
            self.pop_pending()
        } else {
            Some(self.drawn.remove(0))
        }
    }

    /// Move the pending minimum onto the drawn prefix.
    fn draw_next(&mut self) {
        if let Some(e) = self.pop_pending() {
            self.drawn.push(e);
        }
    }

    fn pop_pending(&mut self) -> Option<(V, Label)> {
        if self.pending.is_empty() {
            return None;
        }
        let last = self.pending.len() - 1;
        self.pending.swap(0, last);
        let out = self.pending.pop();
        if !self.pending.is_empty() {
            self.sift_down(0);
        }
        out
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.pending.len();
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut smallest = i;
            if l < n && heap_lt(&self.pending[l].0, &self.pending[smallest].0) {
                smallest = l;
            }
            if r < n && heap_lt(&self.pending[r].0, &self.pending[smallest].0) {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.pending.swap(i, smallest);
            i = smallest;
        }
    }
}
