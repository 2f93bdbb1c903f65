use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Bounded selector keeping the `N` highest-scoring items of a stream.
///
/// Memory stays at `O(N)` no matter how many items are pushed. Internally a
/// min-heap: while below capacity every item is inserted; at capacity a new
/// item only replaces the current minimum when its score is strictly greater.
/// Among equal scores the item pushed first ranks higher, so results are
/// deterministic.
///
/// ```
/// use sieve_core::TopN;
///
/// let mut top = TopN::new(2);
/// top.push(0.3, "a");
/// top.push(0.9, "b");
/// top.push(0.5, "c");
/// let items: Vec<_> = top.into_sorted_vec().into_iter().map(|(_, d)| d).collect();
/// assert_eq!(items, vec!["b", "c"]);
/// ```
#[derive(Debug)]
pub struct TopN<T> {
    capacity: usize,
    heap: BinaryHeap<Reverse<Entry<T>>>,
    pushed: u64,
}

#[derive(Debug)]
struct Entry<T> {
    score: f64,
    seq: u64,
    item: T,
}

// An entry is "greater" when it ranks higher: bigger score, or same score and
// pushed earlier.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> TopN<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1).min(1024)),
            pushed: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Lowest score currently retained.
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.score)
    }

    /// Offer an item. Returns `true` if it was retained.
    pub fn push(&mut self, score: f64, item: T) -> bool {
        let seq = self.pushed;
        self.pushed += 1;
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(Entry { score, seq, item }));
            return true;
        }
        match self.heap.peek() {
            Some(Reverse(min)) if score.total_cmp(&min.score) == Ordering::Greater => {
                self.heap.pop();
                self.heap.push(Reverse(Entry { score, seq, item }));
                true
            }
            _ => false,
        }
    }

    /// Drain into `(score, item)` pairs, highest score first.
    pub fn into_sorted_vec(self) -> Vec<(f64, T)> {
        // Ascending order of Reverse<Entry> is descending rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| (entry.score, entry.item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_highest_scores() {
        let mut top = TopN::new(3);
        for (score, id) in [(0.1, 1), (0.7, 2), (0.4, 3), (0.9, 4), (0.2, 5)] {
            top.push(score, id);
        }
        let ids: Vec<_> = top.into_sorted_vec().into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![4, 2, 3]);
    }

    #[test]
    fn equal_score_does_not_evict() {
        let mut top = TopN::new(1);
        assert!(top.push(1.0, "first"));
        assert!(!top.push(1.0, "second"));
        assert_eq!(top.into_sorted_vec()[0].1, "first");
    }

    #[test]
    fn ties_keep_push_order() {
        let mut top = TopN::new(4);
        for id in 0..4 {
            top.push(0.0, id);
        }
        let ids: Vec<_> = top.into_sorted_vec().into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let mut top = TopN::new(0);
        assert!(!top.push(5.0, ()));
        assert!(top.is_empty());
        assert_eq!(top.min_score(), None);
    }

    #[test]
    fn min_score_tracks_eviction() {
        let mut top = TopN::new(2);
        top.push(0.5, 'a');
        top.push(0.8, 'b');
        assert_eq!(top.min_score(), Some(0.5));
        top.push(0.6, 'c');
        assert_eq!(top.min_score(), Some(0.6));
        assert_eq!(top.len(), 2);
    }
}
