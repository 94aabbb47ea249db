//! Query context for nearest neighbour searches.

use ordered_float::OrderedFloat;
use photon_core::pbrt::*;
use std::collections::BinaryHeap;

/// Scratch state of a k-nearest-neighbour query: a bounded max-heap of the
/// closest candidates seen so far keyed by squared distance, and the current
/// search bound.
///
/// A context is owned by the caller and refilled by every query, so each
/// thread querying a store needs its own.
#[derive(Clone, Debug, Default)]
pub struct NearestPhotons {
    /// Maximum number of photons to keep.
    k: usize,

    /// Squared search radius. Shrinks to the k-th best distance once the heap
    /// is full.
    max_dist_sq: Float,

    /// Candidates as (squared distance, photon index).
    heap: BinaryHeap<(OrderedFloat<Float>, usize)>,
}

impl NearestPhotons {
    /// Returns a context for queries of up to `k` photons.
    ///
    /// * `k` - Number of photons to look for.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_dist_sq: INFINITY,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    /// Clears the previous results and sets up a new query.
    ///
    /// * `k`           - Number of photons to look for.
    /// * `max_dist_sq` - Initial squared search radius.
    pub fn reset(&mut self, k: usize, max_dist_sq: Float) {
        self.k = k;
        self.max_dist_sq = max_dist_sq;
        self.heap.clear();
        if self.heap.capacity() < k + 1 {
            self.heap.reserve(k + 1 - self.heap.len());
        }
    }

    /// Offers a photon to the result set.
    ///
    /// * `index`   - Index of the photon in its store.
    /// * `dist_sq` - Squared distance from the query point.
    #[inline]
    pub fn consider(&mut self, index: usize, dist_sq: Float) {
        if self.k == 0 || !(dist_sq < self.max_dist_sq) {
            return;
        }
        if self.heap.len() == self.k {
            self.heap.pop();
        }
        self.heap.push((OrderedFloat(dist_sq), index));
        if self.heap.len() == self.k {
            if let Some((d, _)) = self.heap.peek() {
                self.max_dist_sq = d.into_inner();
            }
        }
    }

    /// Returns the number of photons requested by the current query.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of photons found.
    pub fn found(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no photons were found.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns true if `k` photons were found.
    pub fn is_full(&self) -> bool {
        self.k > 0 && self.heap.len() == self.k
    }

    /// Returns the current squared search radius.
    pub fn max_dist_sq(&self) -> Float {
        self.max_dist_sq
    }

    /// Returns the squared distance of the farthest photon found.
    pub fn farthest_dist_sq(&self) -> Option<Float> {
        self.heap.peek().map(|(d, _)| d.into_inner())
    }

    /// Returns the closest photon found as (index, squared distance).
    pub fn nearest(&self) -> Option<(usize, Float)> {
        self.heap
            .iter()
            .min()
            .map(|(d, i)| (*i, d.into_inner()))
    }

    /// Iterates over the photons found as (index, squared distance) in heap
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Float)> + '_ {
        self.heap.iter().map(|(d, i)| (*i, d.into_inner()))
    }

    /// Returns the photons found sorted by increasing distance.
    pub fn sorted(&self) -> Vec<(usize, Float)> {
        let mut v: Vec<(usize, Float)> = self.iter().collect();
        v.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_k_closest() {
        let mut np = NearestPhotons::new(3);
        for (i, d) in [5.0, 1.0, 4.0, 2.0, 3.0].iter().enumerate() {
            np.consider(i, *d);
        }
        assert_eq!(np.found(), 3);
        assert!(np.is_full());
        assert_eq!(np.farthest_dist_sq(), Some(3.0));
        assert_eq!(np.max_dist_sq(), 3.0);
        assert_eq!(np.nearest(), Some((1, 1.0)));
        assert_eq!(np.sorted(), vec![(1, 1.0), (3, 2.0), (4, 3.0)]);
    }

    #[test]
    fn respects_initial_radius() {
        let mut np = NearestPhotons::new(10);
        np.reset(10, 2.0);
        np.consider(0, 1.0);
        np.consider(1, 2.0);
        np.consider(2, 7.0);
        assert_eq!(np.found(), 1);
        assert!(!np.is_full());
        assert_eq!(np.max_dist_sq(), 2.0);
    }

    #[test]
    fn reset_clears_results() {
        let mut np = NearestPhotons::new(2);
        np.consider(0, 1.0);
        np.reset(4, INFINITY);
        assert!(np.is_empty());
        assert_eq!(np.k(), 4);
        assert_eq!(np.farthest_dist_sq(), None);
    }

    #[test]
    fn zero_k_finds_nothing() {
        let mut np = NearestPhotons::new(0);
        np.consider(0, 0.0);
        assert!(np.is_empty());
    }

    #[test]
    fn nan_distances_are_ignored() {
        let mut np = NearestPhotons::new(2);
        np.consider(0, Float::NAN);
        assert!(np.is_empty());
    }
}
