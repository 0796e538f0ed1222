//! Fixed-capacity top-K selection over feature scores.
//!
//! [`ScoreBoundedSelector`] keeps the K highest scores offered so far in a
//! bounded min-heap: the root is always the weakest kept entry, so an offer
//! costs one comparison when it loses and O(log K) when it evicts.
//!
//! NaN scores rank below every real score. A NaN entry is kept only while the
//! selector has room, never displaces a real score, and is the first entry
//! displaced by one. Equal scores rank by offer order, earlier first.

use crate::core::error::{RankerError, Result};
use crate::core::types::{FeatureIndex, FeatureScore};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

/// Total order on scores with NaN as the lowest value
fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Heap entry ordered so that the weakest entry is the greatest
#[derive(Debug, Clone, Copy)]
struct Entry {
    item: FeatureScore,
    seq: u64,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_scores(other.item.score, self.item.score).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Keeps the `capacity` best-scoring features seen so far
#[derive(Debug, Clone)]
pub struct ScoreBoundedSelector {
    capacity: usize,
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl ScoreBoundedSelector {
    /// Create an empty selector; `capacity` must be at least 1
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RankerError::invalid_argument(
                "capacity",
                "0",
                "selector capacity must be at least 1",
            ));
        }
        Ok(ScoreBoundedSelector {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
            next_seq: 0,
        })
    }

    /// Offer a feature with its score
    pub fn offer(&mut self, feature: FeatureIndex, score: f64) {
        self.offer_score(FeatureScore::new(feature, score));
    }

    /// Offer a prepared score.
    ///
    /// Inserted unconditionally while below capacity; afterwards it replaces
    /// the weakest kept entry only if its score is strictly greater.
    pub fn offer_score(&mut self, item: FeatureScore) {
        let entry = Entry {
            item,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(entry);
            return;
        }

        let evict = match self.heap.peek() {
            Some(weakest) => compare_scores(item.score, weakest.item.score) == Ordering::Greater,
            None => false,
        };
        if evict {
            self.heap.pop();
            self.heap.push(entry);
        }
    }

    /// Offer every score of an iterator
    pub fn offer_all<I: IntoIterator<Item = FeatureScore>>(&mut self, items: I) {
        for item in items {
            self.offer_score(item);
        }
    }

    /// Number of kept entries
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no entry is kept
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Maximum number of kept entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Weakest kept score, once the selector holds anything
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.item.score)
    }

    /// Drain the kept entries, best first.
    ///
    /// The selector is left empty; the returned iterator yields lazily, one
    /// heap pop per item. Calling this again yields nothing until new offers
    /// are made.
    pub fn pop_all(&mut self) -> PopAll {
        let entries: Vec<Reverse<Entry>> = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .map(Reverse)
            .collect();
        PopAll {
            heap: BinaryHeap::from(entries),
        }
    }
}

/// Descending drain of a [`ScoreBoundedSelector`]
#[derive(Debug)]
pub struct PopAll {
    heap: BinaryHeap<Reverse<Entry>>,
}

impl Iterator for PopAll {
    type Item = FeatureScore;

    fn next(&mut self) -> Option<FeatureScore> {
        self.heap.pop().map(|Reverse(entry)| entry.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

impl ExactSizeIterator for PopAll {}

impl FusedIterator for PopAll {}

/// Keep the best `k` of a score stream, best first
pub fn top_k<I: IntoIterator<Item = FeatureScore>>(items: I, k: usize) -> Result<Vec<FeatureScore>> {
    let mut selector = ScoreBoundedSelector::new(k)?;
    selector.offer_all(items);
    Ok(selector.pop_all().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(items: &[FeatureScore]) -> Vec<f64> {
        items.iter().map(|s| s.score).collect()
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            ScoreBoundedSelector::new(0),
            Err(RankerError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_keeps_highest_scores() {
        let mut selector = ScoreBoundedSelector::new(3).unwrap();
        for (feature, score) in [(0, 5.0), (1, 9.0), (2, 1.0), (3, 7.0), (4, 9.0)] {
            selector.offer(feature, score);
        }
        assert_eq!(selector.len(), 3);
        assert_eq!(selector.min_score(), Some(7.0));

        let ranked: Vec<FeatureScore> = selector.pop_all().collect();
        assert_eq!(scores(&ranked), vec![9.0, 9.0, 7.0]);
        // equal scores keep offer order
        assert_eq!(ranked[0].feature, 1);
        assert_eq!(ranked[1].feature, 4);
        assert_eq!(ranked[2].feature, 3);
        assert!(selector.is_empty());
    }

    #[test]
    fn test_equal_score_does_not_evict() {
        let mut selector = ScoreBoundedSelector::new(1).unwrap();
        selector.offer(0, 2.0);
        selector.offer(1, 2.0);
        let ranked: Vec<FeatureScore> = selector.pop_all().collect();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].feature, 0);
    }

    #[test]
    fn test_fewer_offers_than_capacity() {
        let mut selector = ScoreBoundedSelector::new(10).unwrap();
        selector.offer(0, -1.0);
        selector.offer(1, 3.0);
        let ranked: Vec<FeatureScore> = selector.pop_all().collect();
        assert_eq!(scores(&ranked), vec![3.0, -1.0]);
    }

    #[test]
    fn test_nan_ranks_lowest() {
        let mut selector = ScoreBoundedSelector::new(2).unwrap();
        selector.offer(0, f64::NAN);
        selector.offer(1, -100.0);
        // full: NaN is the weakest and is displaced by any real score
        selector.offer(2, -50.0);
        selector.offer(3, f64::NAN);

        let ranked: Vec<FeatureScore> = selector.pop_all().collect();
        let features: Vec<usize> = ranked.iter().map(|s| s.feature).collect();
        assert_eq!(features, vec![2, 1]);
    }

    #[test]
    fn test_pop_all_is_one_shot() {
        let mut selector = ScoreBoundedSelector::new(2).unwrap();
        selector.offer(0, 1.0);
        selector.offer(1, 2.0);

        let mut drain = selector.pop_all();
        assert_eq!(drain.len(), 2);
        assert_eq!(drain.next().map(|s| s.feature), Some(1));
        assert_eq!(drain.next().map(|s| s.feature), Some(0));
        assert!(drain.next().is_none());
        assert!(drain.next().is_none());

        assert_eq!(selector.pop_all().count(), 0);
    }

    #[test]
    fn test_aux_survives_selection() {
        let ranked = top_k(
            vec![
                FeatureScore::with_aux(0, 0.2, -3.5),
                FeatureScore::with_aux(1, 0.9, 4.0),
            ],
            1,
        )
        .unwrap();
        assert_eq!(ranked, vec![FeatureScore::with_aux(1, 0.9, 4.0)]);
    }
}
