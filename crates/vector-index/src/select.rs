use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A scored corpus position. `Greater` means ranked higher: larger score first, then the
/// earlier position.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    key: f32,
    position: usize,
}

impl Candidate {
    fn new(score: f32, position: usize) -> Self {
        // NaN ranks last; adding 0.0 folds -0.0 into 0.0 so zero scores tie by position.
        let key = if score.is_nan() {
            f32::NEG_INFINITY
        } else {
            score + 0.0
        };
        Self { key, position }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.position.cmp(&self.position))
    }
}

/// Positions of the `k` best scores, best first. Equal scores keep corpus order.
///
/// Keeps a bounded min-heap of size `k`, so the pass is O(N log k).
pub(crate) fn top_k_positions(scores: &[f32], k: usize) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> =
        BinaryHeap::with_capacity(k.min(scores.len()) + 1);
    for (position, &score) in scores.iter().enumerate() {
        let candidate = Candidate::new(score, position);
        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(worst)) = heap.peek() {
            if candidate > *worst {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // Ascending order of `Reverse` is descending rank.
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(candidate)| candidate.position)
        .collect()
}
