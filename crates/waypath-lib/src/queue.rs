//! Stable min-priority queue keyed by `f64` scores.
//!
//! Entries with equal priority come out in insertion order, which keeps
//! search results reproducible across runs. There is no decrease-key: callers
//! push again when they find a cheaper cost and discard stale pops.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug)]
struct QueueEntry<K> {
    priority: FloatOrd,
    sequence: u64,
    key: K,
}

impl<K> PartialEq for QueueEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for QueueEntry<K> {}

impl<K> Ord for QueueEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap; lower sequence wins ties.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl<K> PartialOrd for QueueEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue with insertion-ordered tie-breaking.
#[derive(Debug)]
pub struct MinQueue<K> {
    heap: BinaryHeap<QueueEntry<K>>,
    next_sequence: u64,
}

impl<K> MinQueue<K> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn insert(&mut self, key: K, priority: f64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueueEntry {
            priority: FloatOrd(priority),
            sequence,
            key,
        });
    }

    /// Remove and return the entry with the lowest priority.
    pub fn extract_min(&mut self) -> Option<(K, f64)> {
        self.heap.pop().map(|entry| (entry.key, entry.priority.0))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<K> Default for MinQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_priority_order() {
        let mut queue = MinQueue::new();
        queue.insert("c", 3.0);
        queue.insert("a", 1.0);
        queue.insert("b", 2.0);

        assert_eq!(queue.extract_min(), Some(("a", 1.0)));
        assert_eq!(queue.extract_min(), Some(("b", 2.0)));
        assert_eq!(queue.extract_min(), Some(("c", 3.0)));
        assert!(queue.is_empty());
        assert_eq!(queue.extract_min(), None);
    }

    #[test]
    fn ties_follow_insertion_order() {
        let mut queue = MinQueue::new();
        for key in ["first", "second", "third"] {
            queue.insert(key, 5.0);
        }
        queue.insert("cheaper", 4.0);

        let order: Vec<_> = std::iter::from_fn(|| queue.extract_min().map(|(k, _)| k)).collect();
        assert_eq!(order, vec!["cheaper", "first", "second", "third"]);
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let mut queue = MinQueue::new();
        queue.insert(7, 10.0);
        queue.insert(7, 2.0);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.extract_min(), Some((7, 2.0)));
        assert_eq!(queue.extract_min(), Some((7, 10.0)));
    }

    #[test]
    fn infinity_sorts_last() {
        let mut queue = MinQueue::new();
        queue.insert('x', f64::INFINITY);
        queue.insert('y', 1e300);
        assert_eq!(queue.extract_min().map(|(k, _)| k), Some('y'));
    }
}
