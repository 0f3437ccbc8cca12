use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::analyzers::types::ZeroScoreSegment;

/// Orders samples by length, breaking ties in favour of the smaller id.
#[derive(Debug)]
struct ByLength(ZeroScoreSegment);

impl Ord for ByLength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .length_m
            .total_cmp(&other.0.length_m)
            .then_with(|| other.0.segment_id.cmp(&self.0.segment_id))
    }
}

impl PartialOrd for ByLength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ByLength {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByLength {}

/// Keeps the `limit` longest zero-score segments seen so far.
///
/// A min-heap holds at most `limit` entries, so memory does not grow with the
/// number of zero-score segments scanned.
#[derive(Debug)]
pub struct ZeroScoreSamples {
    limit: usize,
    heap: BinaryHeap<Reverse<ByLength>>,
}

impl ZeroScoreSamples {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            heap: BinaryHeap::with_capacity(limit + 1),
        }
    }

    pub fn push(&mut self, segment: ZeroScoreSegment) {
        if self.limit == 0 {
            return;
        }
        let candidate = ByLength(segment);
        if self.heap.len() < self.limit {
            self.heap.push(Reverse(candidate));
        } else if let Some(Reverse(shortest)) = self.heap.peek()
            && candidate > *shortest
        {
            self.heap.pop();
            self.heap.push(Reverse(candidate));
        }
    }

    /// Samples ordered by descending length.
    pub fn into_sorted(self) -> Vec<ZeroScoreSegment> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(ByLength(segment))| segment)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str, length_m: f64) -> ZeroScoreSegment {
        ZeroScoreSegment {
            segment_id: Some(id.to_string()),
            name: "Unknown".to_string(),
            length_m,
        }
    }

    #[test]
    fn test_keeps_longest_in_descending_order() {
        let mut samples = ZeroScoreSamples::new(3);
        for (i, len) in [5.0, 120.5, 0.0, 33.3, 87.0, 1.0].iter().enumerate() {
            samples.push(seg(&format!("S{i}"), *len));
        }

        let lengths: Vec<f64> = samples.into_sorted().iter().map(|s| s.length_m).collect();
        assert_eq!(lengths, vec![120.5, 87.0, 33.3]);
    }

    #[test]
    fn test_fewer_than_limit() {
        let mut samples = ZeroScoreSamples::new(10);
        samples.push(seg("A", 1.0));
        samples.push(seg("B", 2.0));

        let ids: Vec<_> = samples
            .into_sorted()
            .into_iter()
            .map(|s| s.segment_id.unwrap())
            .collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut samples = ZeroScoreSamples::new(0);
        samples.push(seg("A", 1.0));
        assert!(samples.into_sorted().is_empty());
    }
}
