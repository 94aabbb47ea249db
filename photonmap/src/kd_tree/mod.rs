//! KD Tree.

use crate::photon::*;
use order_stat::kth_by;
use photon_core::geometry::*;
use photon_core::pbrt::*;
use std::cmp::Ordering;

mod nearest;

// Re-export
pub use nearest::*;

/// A balanced kd-tree over photons stored as an implicit binary tree: node `i`
/// has children `2i + 1` and `2i + 2` and splits space along the axis
/// `depth mod 3`. Every photon in a left subtree has a coordinate along the
/// node's axis that is less than or equal to the node's; every photon in a
/// right subtree has one that is greater than or equal.
///
/// The tree is left-balanced, so `n` photons always occupy slots `0..n`.
#[derive(Clone, Debug)]
pub struct KdTree<T> {
    /// The photons in heap order.
    nodes: Vec<T>,
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        Self { nodes: vec![] }
    }
}

impl<T: PhotonRecord> KdTree<T> {
    /// Builds a balanced tree from an unordered list of photons in
    /// O(n log n). Ties along a split axis are broken by the photons' order in
    /// `photons`, so a given input always produces the same layout.
    ///
    /// * `photons` - The photons.
    pub fn build(photons: Vec<T>) -> Self {
        let n = photons.len();
        if n == 0 {
            return Self::default();
        }

        // Compute the heap layout as indices into `photons`.
        let mut segment: Vec<usize> = (0..n).collect();
        let mut layout = vec![0_usize; n];
        balance_segment(&photons, &mut segment, 0, 0, &mut layout);

        // Move the photons into their slots.
        let mut slots: Vec<Option<T>> = photons.into_iter().map(Some).collect();
        let nodes: Vec<T> = layout.iter().filter_map(|&i| slots[i].take()).collect();
        debug_assert_eq!(nodes.len(), n);

        Self { nodes }
    }

    /// Returns the number of photons in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no photons.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the photon stored at a slot.
    ///
    /// * `index` - Slot index.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.nodes.get(index)
    }

    /// Returns the photon stored at a slot as mutable. Only the photon's
    /// payload may be changed; its position determines the layout.
    ///
    /// * `index` - Slot index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.nodes.get_mut(index)
    }

    /// Returns the photons in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.nodes
    }

    /// Iterates over the photons in heap order with mutable access to their
    /// payload.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.nodes.iter_mut()
    }

    /// Consumes the tree and returns its photons in heap order.
    pub fn into_vec(self) -> Vec<T> {
        self.nodes
    }

    /// Returns the discriminator axis of a slot.
    ///
    /// * `index` - Slot index.
    pub fn axis_of(index: usize) -> Axis {
        Axis::for_depth(depth_of(index))
    }

    /// Finds up to `nearest.k()` photons closest to `p` within the context's
    /// search radius, skipping photons whose flags intersect `exclude`. Results
    /// are added to `nearest`, which is not reset first so that several
    /// sources can be searched with one context.
    ///
    /// * `p`       - Query point.
    /// * `exclude` - Flags of photons to skip.
    /// * `nearest` - Query context receiving the results.
    pub fn locate(&self, p: &Point3f, exclude: PhotonFlags, nearest: &mut NearestPhotons) {
        if !self.nodes.is_empty() {
            self.locate_from(0, 0, p, exclude, nearest);
        }
    }

    fn locate_from(
        &self,
        index: usize,
        depth: usize,
        p: &Point3f,
        exclude: PhotonFlags,
        nearest: &mut NearestPhotons,
    ) {
        let n = self.nodes.len();
        let node = &self.nodes[index];

        let left = 2 * index + 1;
        if left < n {
            // Visit the side of the split plane containing `p` first, then the
            // other side if it can still hold something closer.
            let axis = Axis::for_depth(depth);
            let delta = p[axis] - node.position()[axis];
            let (near, far) = if delta < 0.0 {
                (left, left + 1)
            } else {
                (left + 1, left)
            };
            if near < n {
                self.locate_from(near, depth + 1, p, exclude, nearest);
            }
            if far < n && delta * delta < nearest.max_dist_sq() {
                self.locate_from(far, depth + 1, p, exclude, nearest);
            }
        }

        if !node.flags().intersects(exclude) {
            nearest.consider(index, p.distance_squared(node.position()));
        }
    }
}

impl<T: PhotonRecord + Oriented> KdTree<T> {
    /// Finds the single closest photon whose normal is within the given cosine
    /// of `n`. Returns the slot index and squared distance.
    ///
    /// * `p`             - Query point.
    /// * `n`             - Unit surface normal at `p`.
    /// * `cos_threshold` - Minimum dot product between `n` and a candidate's
    ///                     normal.
    /// * `max_dist_sq`   - Squared search radius.
    pub fn nearest_oriented(
        &self,
        p: &Point3f,
        n: &Normal3f,
        cos_threshold: Float,
        max_dist_sq: Float,
    ) -> Option<(usize, Float)> {
        let mut best = OrientedBest {
            found: None,
            max_dist_sq,
        };
        if !self.nodes.is_empty() {
            self.nearest_oriented_from(0, 0, p, n, cos_threshold, &mut best);
        }
        best.found
    }

    fn nearest_oriented_from(
        &self,
        index: usize,
        depth: usize,
        p: &Point3f,
        n: &Normal3f,
        cos_threshold: Float,
        best: &mut OrientedBest,
    ) {
        let len = self.nodes.len();
        let node = &self.nodes[index];

        let left = 2 * index + 1;
        if left < len {
            let axis = Axis::for_depth(depth);
            let delta = p[axis] - node.position()[axis];
            let (near, far) = if delta < 0.0 {
                (left, left + 1)
            } else {
                (left + 1, left)
            };
            if near < len {
                self.nearest_oriented_from(near, depth + 1, p, n, cos_threshold, best);
            }
            if far < len && delta * delta < best.max_dist_sq {
                self.nearest_oriented_from(far, depth + 1, p, n, cos_threshold, best);
            }
        }

        let dist_sq = p.distance_squared(node.position());
        if dist_sq < best.max_dist_sq && node.normal().dot(n) >= cos_threshold {
            best.max_dist_sq = dist_sq;
            best.found = Some((index, dist_sq));
        }
    }
}

/// Running best candidate of a normal constrained search.
struct OrientedBest {
    found: Option<(usize, Float)>,
    max_dist_sq: Float,
}

/// Returns the depth of a slot in the implicit tree.
fn depth_of(index: usize) -> usize {
    (usize::BITS - 1 - (index + 1).leading_zeros()) as usize
}

/// Returns the number of nodes in the left subtree of a left-balanced tree
/// with `n` nodes.
fn left_subtree_size(n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    // Number of complete levels below the root.
    let h = (usize::BITS - 1 - n.leading_zeros()) as usize;
    let half_last_level = 1_usize << (h - 1);
    let complete = (1_usize << h) - 1;
    let last_level = n - complete;
    (half_last_level - 1) + min(last_level, half_last_level)
}

/// Orders two photons along an axis; equal coordinates are ordered by their
/// input position.
fn compare_along<T: PhotonRecord>(photons: &[T], a: usize, b: usize, axis: Axis) -> Ordering {
    let pa = photons[a].position()[axis];
    let pb = photons[b].position()[axis];
    pa.total_cmp(&pb).then(a.cmp(&b))
}

/// Recursively selects the median of `segment` along the axis for `depth`,
/// stores it at `slot` and balances both halves into the child slots.
fn balance_segment<T: PhotonRecord>(
    photons: &[T],
    segment: &mut [usize],
    slot: usize,
    depth: usize,
    layout: &mut [usize],
) {
    if segment.is_empty() {
        return;
    }

    let axis = Axis::for_depth(depth);
    let median = left_subtree_size(segment.len());
    kth_by(segment, median, |a, b| compare_along(photons, *a, *b, axis));
    layout[slot] = segment[median];

    let (below, rest) = segment.split_at_mut(median);
    balance_segment(photons, below, 2 * slot + 1, depth + 1, layout);
    balance_segment(photons, &mut rest[1..], 2 * slot + 2, depth + 1, layout);
}

#[cfg(test)]
mod tests {
    use super::*;
    use photon_core::rng::RNG;
    use photon_core::spectrum::Spectrum;
    use proptest::prelude::*;

    fn photon_at(x: Float, y: Float, z: Float) -> Photon {
        Photon::new(
            Point3f::new(x, y, z),
            Spectrum::ONE,
            Vector3f::new(0.0, 0.0, -1.0),
            PhotonFlags::INDIRECT,
        )
    }

    fn random_photons(rng: &mut RNG, n: usize) -> Vec<Photon> {
        (0..n)
            .map(|_| photon_at(rng.uniform_float(), rng.uniform_float(), rng.uniform_float()))
            .collect()
    }

    fn brute_force(photons: &[Photon], p: &Point3f, k: usize, max_dist_sq: Float) -> Vec<Float> {
        let mut d: Vec<Float> = photons
            .iter()
            .map(|ph| p.distance_squared(&ph.p))
            .filter(|d| *d < max_dist_sq)
            .collect();
        d.sort_by(|a, b| a.total_cmp(b));
        d.truncate(k);
        d
    }

    fn subtree(n: usize, root: usize, out: &mut Vec<usize>) {
        if root < n {
            out.push(root);
            subtree(n, 2 * root + 1, out);
            subtree(n, 2 * root + 2, out);
        }
    }

    fn assert_balanced(tree: &KdTree<Photon>) {
        let nodes = tree.as_slice();
        let n = nodes.len();
        for i in 0..n {
            let axis = KdTree::<Photon>::axis_of(i);
            let v = nodes[i].p[axis];
            let mut left = vec![];
            subtree(n, 2 * i + 1, &mut left);
            for j in left {
                assert!(nodes[j].p[axis] <= v, "left descendant {} of {} above split", j, i);
            }
            let mut right = vec![];
            subtree(n, 2 * i + 2, &mut right);
            for j in right {
                assert!(nodes[j].p[axis] >= v, "right descendant {} of {} below split", j, i);
            }
        }
    }

    #[test]
    fn left_subtree_sizes() {
        assert_eq!(left_subtree_size(1), 0);
        assert_eq!(left_subtree_size(2), 1);
        assert_eq!(left_subtree_size(3), 1);
        assert_eq!(left_subtree_size(4), 2);
        assert_eq!(left_subtree_size(5), 3);
        assert_eq!(left_subtree_size(6), 3);
        assert_eq!(left_subtree_size(7), 3);
        assert_eq!(left_subtree_size(8), 4);
        assert_eq!(left_subtree_size(12), 7);
    }

    #[test]
    fn depths_and_axes() {
        assert_eq!(depth_of(0), 0);
        assert_eq!(depth_of(1), 1);
        assert_eq!(depth_of(2), 1);
        assert_eq!(depth_of(3), 2);
        assert_eq!(depth_of(6), 2);
        assert_eq!(depth_of(7), 3);
        assert_eq!(KdTree::<Photon>::axis_of(7), Axis::X);
        assert_eq!(KdTree::<Photon>::axis_of(4), Axis::Z);
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let tree = KdTree::<Photon>::build(vec![]);
        let mut np = NearestPhotons::new(4);
        tree.locate(&Point3f::zero(), PhotonFlags::empty(), &mut np);
        assert!(np.is_empty());
    }

    #[test]
    fn build_keeps_every_photon() {
        let mut rng = RNG::new(1);
        let photons = random_photons(&mut rng, 100);
        let tree = KdTree::build(photons.clone());
        assert_eq!(tree.len(), 100);
        let mut xs: Vec<Float> = tree.as_slice().iter().map(|p| p.p.x).collect();
        let mut expected: Vec<Float> = photons.iter().map(|p| p.p.x).collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        expected.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(xs, expected);
    }

    #[test]
    fn build_is_deterministic_with_ties() {
        let photons: Vec<Photon> = (0..20).map(|i| photon_at((i % 3) as Float, 0.0, (i % 2) as Float)).collect();
        let a = KdTree::build(photons.clone());
        let b = KdTree::build(photons);
        assert_eq!(a.as_slice(), b.as_slice());
        assert_balanced(&a);
    }

    #[test]
    fn excluded_photons_are_skipped() {
        let mut photons = vec![photon_at(0.0, 0.0, 0.0), photon_at(1.0, 0.0, 0.0)];
        photons[0].flags = PhotonFlags::DIRECT;
        let tree = KdTree::build(photons);
        let mut np = NearestPhotons::new(2);
        tree.locate(&Point3f::zero(), PhotonFlags::DIRECT, &mut np);
        assert_eq!(np.found(), 1);
        let (i, d) = np.nearest().unwrap();
        assert_eq!(tree.get(i).unwrap().p.x, 1.0);
        assert_eq!(d, 1.0);
    }

    #[test]
    fn radius_limits_results() {
        let photons: Vec<Photon> = (0..10).map(|i| photon_at(i as Float, 0.0, 0.0)).collect();
        let tree = KdTree::build(photons);
        let mut np = NearestPhotons::new(10);
        np.reset(10, 4.5);
        tree.locate(&Point3f::zero(), PhotonFlags::empty(), &mut np);
        // 0, 1 and 2 lie within a squared distance of 4.5.
        assert_eq!(np.found(), 3);
    }

    #[test]
    fn oriented_nearest_rejects_opposed_normals() {
        let mk = |x: Float, nz: Float| {
            IrradiancePhoton::new(photon_at(x, 0.0, 0.0), Normal3f::new(0.0, 0.0, nz))
        };
        let tree = KdTree::build(vec![mk(0.1, -1.0), mk(0.5, 1.0), mk(2.0, 1.0)]);
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let (i, d) = tree.nearest_oriented(&Point3f::zero(), &n, 0.9, INFINITY).unwrap();
        assert_eq!(tree.get(i).unwrap().photon.p.x, 0.5);
        assert!((d - 0.25).abs() < 1e-6);
        assert!(tree.nearest_oriented(&Point3f::zero(), &n, 0.9, 0.2).is_none());
        assert!(KdTree::<IrradiancePhoton>::build(vec![])
            .nearest_oriented(&Point3f::zero(), &n, 0.0, INFINITY)
            .is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn layout_satisfies_split_invariant(seed in 0u64..1000, n in 1usize..200) {
            let mut rng = RNG::new(seed);
            let tree = KdTree::build(random_photons(&mut rng, n));
            prop_assert_eq!(tree.len(), n);
            assert_balanced(&tree);
        }

        #[test]
        fn knn_matches_brute_force(
            seed in 0u64..1000,
            n in 1usize..300,
            k in 1usize..40,
            qx in -0.5..1.5f32, qy in -0.5..1.5f32, qz in -0.5..1.5f32,
            bounded in proptest::bool::ANY,
        ) {
            let mut rng = RNG::new(seed);
            let photons = random_photons(&mut rng, n);
            let tree = KdTree::build(photons.clone());
            let p = Point3f::new(qx, qy, qz);
            let max_dist_sq = if bounded { 0.1 } else { INFINITY };

            let mut np = NearestPhotons::new(k);
            np.reset(k, max_dist_sq);
            tree.locate(&p, PhotonFlags::empty(), &mut np);

            let found: Vec<Float> = np.sorted().iter().map(|(_, d)| *d).collect();
            prop_assert_eq!(found, brute_force(&photons, &p, k, max_dist_sq));
        }

        #[test]
        fn oriented_nearest_matches_brute_force(seed in 0u64..1000, n in 1usize..200) {
            let mut rng = RNG::new(seed);
            let photons: Vec<IrradiancePhoton> = random_photons(&mut rng, n)
                .into_iter()
                .map(|ph| {
                    let nz = if rng.uniform_float() < 0.5 { 1.0 } else { -1.0 };
                    IrradiancePhoton::new(ph, Normal3f::new(0.0, 0.0, nz))
                })
                .collect();
            let tree = KdTree::build(photons.clone());
            let p = Point3f::new(0.5, 0.5, 0.5);
            let up = Normal3f::new(0.0, 0.0, 1.0);

            let expected = photons
                .iter()
                .filter(|ph| ph.n.z > 0.0)
                .map(|ph| p.distance_squared(&ph.photon.p))
                .min_by(|a, b| a.total_cmp(b));
            let found = tree.nearest_oriented(&p, &up, 0.9, INFINITY).map(|(_, d)| d);
            prop_assert_eq!(found, expected);
        }
    }
}
