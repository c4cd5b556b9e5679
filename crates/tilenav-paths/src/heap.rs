//! Binary min-heap keyed by a numeric priority.
//!
//! Unlike [`std::collections::BinaryHeap`] the priority is kept apart from
//! the payload and only needs [`PartialOrd`], so `f32` costs work without a
//! total-order wrapper. There is no decrease-key: searches push duplicates
//! and drop stale entries when they pop them.

/// A binary min-heap over `(priority, payload)` pairs.
///
/// Entries with equal priority come out in an unspecified order.
#[derive(Debug, Clone)]
pub struct MinHeap<K, V> {
    items: Vec<(K, V)>,
}

impl<K: PartialOrd, V> Default for MinHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialOrd, V> MinHeap<K, V> {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty heap with room for `cap` entries.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            items: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The minimum entry without removing it.
    pub fn peek(&self) -> Option<(&K, &V)> {
        self.items.first().map(|(k, v)| (k, v))
    }

    /// Insert an entry. O(log n).
    pub fn push(&mut self, priority: K, payload: V) {
        self.items.push((priority, payload));
        self.sift_up(self.items.len() - 1);
    }

    /// Remove and return the minimum-priority entry. O(log n).
    pub fn pop(&mut self) -> Option<(K, V)> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        self.items[a].0 < self.items[b].0
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                return;
            }
            self.items.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.items.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                return;
            }
            let right = left + 1;
            let child = if right < n && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, i) {
                return;
            }
            self.items.swap(i, child);
            i = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{RngExt, SeedableRng};

    #[test]
    fn empty_pop_is_none() {
        let mut h: MinHeap<f32, ()> = MinHeap::new();
        assert!(h.is_empty());
        assert!(h.pop().is_none());
        assert!(h.peek().is_none());
    }

    #[test]
    fn pops_in_priority_order() {
        let mut h = MinHeap::new();
        for (k, v) in [(5.0, 'e'), (1.0, 'a'), (3.5, 'c'), (2.0, 'b'), (4.0, 'd')] {
            h.push(k, v);
        }
        assert_eq!(h.len(), 5);
        assert_eq!(h.peek(), Some((&1.0, &'a')));
        let out: Vec<char> = std::iter::from_fn(|| h.pop().map(|(_, v)| v)).collect();
        assert_eq!(out, vec!['a', 'b', 'c', 'd', 'e']);
    }

    #[test]
    fn duplicates_and_ties_all_come_out() {
        let mut h = MinHeap::new();
        h.push(1.0f32, 10);
        h.push(1.0, 11);
        h.push(0.5, 12);
        h.push(1.0, 10);
        assert_eq!(h.pop(), Some((0.5, 12)));
        let mut rest: Vec<i32> = std::iter::from_fn(|| h.pop().map(|(_, v)| v)).collect();
        rest.sort();
        assert_eq!(rest, vec![10, 10, 11]);
    }

    #[test]
    fn interleaved_push_pop_matches_sorted_order() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut h = MinHeap::with_capacity(64);
        let mut reference: Vec<u32> = Vec::new();
        for round in 0..500 {
            if round % 3 == 2 {
                reference.sort_unstable_by(|a, b| b.cmp(a));
                assert_eq!(h.pop().map(|(k, _)| k), reference.pop());
            } else {
                let k = rng.random_range(0..100u32);
                h.push(k, ());
                reference.push(k);
            }
        }
        reference.sort_unstable();
        let drained: Vec<u32> = std::iter::from_fn(|| h.pop().map(|(k, _)| k)).collect();
        assert_eq!(drained, reference);
    }
}
