//! Photon Map

use crate::bsdf::*;
use crate::kd_tree::*;
use crate::photon::*;
use crate::policy::*;
use crate::settings::*;
use crate::stats::*;
use photon_core::geometry::*;
use photon_core::pbrt::*;
use photon_core::rng::RNG;
use photon_core::sampling::bernoulli;
use photon_core::spectrum::*;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Number of photons per estimate, shared between stores and the code driving
/// them.
pub type SharedLookup = Arc<AtomicUsize>;

/// Returns a new shared estimate size.
///
/// * `k` - Number of photons per estimate.
pub fn shared_lookup(k: usize) -> SharedLookup {
    Arc::new(AtomicUsize::new(k))
}

/// Unnormalized result of a kernel gather.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gather {
    /// Sum of the flux of the gathered photons weighted by the BSDF.
    pub flux: Spectrum,

    /// Squared distance of the farthest photon found.
    pub radius_sq: Float,

    /// Number of photons found.
    pub found: usize,
}

/// Stores photons deposited by light paths and reconstructs radiance from them
/// by density estimation over the k nearest photons.
///
/// Photons are kept in a balanced kd-tree. Photons stored since the last
/// rebuild wait in a pending list that queries scan linearly; their indices
/// follow those of the tree. `check_and_balance()` merges them into the tree.
///
/// Read-only queries take a caller owned `NearestPhotons` context, so a
/// balanced map can be shared between threads that each own a context.
pub struct PhotonMap<T: PhotonRecord> {
    /// Balanced photons.
    pub(crate) tree: KdTree<T>,

    /// Photons stored since the last rebuild.
    pub(crate) pending: Vec<T>,

    /// Maximum number of photons.
    max_photons: usize,

    /// Number of photons per estimate.
    lookup: SharedLookup,

    /// Squared initial search radius.
    pub(crate) max_dist_sq: Float,

    /// Number of photons in the insertion density probe.
    density_lookup: usize,

    /// Pending list length that triggers a rebuild during density control.
    max_pending: usize,

    /// Photons skipped by queries.
    pub(crate) exclude: PhotonFlags,

    /// Minimum normal cosine for cached lookups.
    pub(crate) normal_cosine: Float,

    /// Density at the top of the false colour ramp.
    density_scale: Float,

    /// Admission policy.
    policy: Box<dyn InsertionPolicy>,

    /// Random stream for acceptance decisions.
    rng: RNG,

    /// Query context of the insertion density probe.
    probe: NearestPhotons,

    /// Paths traced.
    n_paths: u64,

    /// Photons offered.
    considered: u64,

    /// Photons rejected.
    rejected: u64,

    /// Rejected photons merged into a neighbour.
    merged: u64,

    /// Number of rebuilds.
    balances: u64,

    /// Whether capacity exhaustion has been reported.
    capacity_warned: bool,

    /// Total weight offered.
    offered_weight: f64,

    /// Total weight kept.
    stored_weight: f64,

    /// Whether the per-photon caches reflect the current contents.
    pub(crate) cache_valid: bool,
}

impl<T: PhotonRecord> PhotonMap<T> {
    /// Create a new `PhotonMap` using the insertion policy from the settings.
    ///
    /// * `settings` - Settings.
    /// * `lookup`   - Shared number of photons per estimate.
    pub fn new(settings: &PhotonMapSettings, lookup: SharedLookup) -> Self {
        Self::with_policy(settings, lookup, settings.insertion_policy())
    }

    /// Create a new `PhotonMap` with the given insertion policy.
    ///
    /// * `settings` - Settings.
    /// * `lookup`   - Shared number of photons per estimate.
    /// * `policy`   - Insertion policy.
    pub fn with_policy(
        settings: &PhotonMapSettings,
        lookup: SharedLookup,
        policy: Box<dyn InsertionPolicy>,
    ) -> Self {
        debug!(
            "New {} map: capacity {}, insertion '{}', rejection '{}'",
            T::KIND,
            settings.max_photons,
            policy.name(),
            policy.rejection()
        );
        Self {
            tree: KdTree::default(),
            pending: vec![],
            max_photons: settings.max_photons,
            lookup,
            max_dist_sq: settings.max_dist_sq(),
            density_lookup: settings.density_lookup,
            max_pending: settings.max_pending,
            exclude: settings.exclude_flags(),
            normal_cosine: settings.normal_cosine,
            density_scale: settings.density_scale,
            policy,
            rng: RNG::new(settings.seed),
            probe: NearestPhotons::new(settings.density_lookup),
            n_paths: 0,
            considered: 0,
            rejected: 0,
            merged: 0,
            balances: 0,
            capacity_warned: false,
            offered_weight: 0.0,
            stored_weight: 0.0,
            cache_valid: false,
        }
    }

    /// Returns the number of photons stored.
    pub fn len(&self) -> usize {
        self.tree.len() + self.pending.len()
    }

    /// Returns true if no photons are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of photons.
    pub fn capacity(&self) -> usize {
        self.max_photons
    }

    /// Returns true if every photon is in the balanced tree.
    pub fn is_balanced(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the number of paths traced.
    pub fn paths(&self) -> u64 {
        self.n_paths
    }

    /// Returns the number of photons per estimate.
    pub fn lookup(&self) -> usize {
        self.lookup.load(Ordering::Relaxed)
    }

    /// Returns the flags of photons that queries skip.
    pub fn exclude(&self) -> PhotonFlags {
        self.exclude
    }

    /// Returns the photon at an index.
    ///
    /// * `index` - Index reported by a query.
    pub fn get(&self, index: usize) -> Option<&T> {
        let n = self.tree.len();
        if index < n {
            self.tree.get(index)
        } else {
            self.pending.get(index - n)
        }
    }

    /// Returns the photon at an index as mutable.
    ///
    /// * `index` - Index reported by a query.
    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let n = self.tree.len();
        if index < n {
            self.tree.get_mut(index)
        } else {
            self.pending.get_mut(index - n)
        }
    }

    /// Iterates over all stored photons, balanced ones first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.tree.as_slice().iter().chain(self.pending.iter())
    }

    /// Returns the flux of all stored photons.
    pub fn total_power(&self) -> Spectrum {
        self.iter().map(|p| p.flux()).sum()
    }

    /// Records one traced path. Call once per path no matter how many photons
    /// it deposited.
    pub fn add_path(&mut self) {
        self.n_paths += 1;
    }

    /// Records several traced paths.
    ///
    /// * `n` - Number of paths.
    pub fn add_paths(&mut self, n: u64) {
        self.n_paths += n;
    }

    /// Offers a photon to the store and returns whether it was stored or its
    /// flux merged into a stored neighbour.
    ///
    /// * `photon` - The photon.
    /// * `n`      - Unit surface normal at the photon position.
    pub fn add_photon(&mut self, mut photon: T, n: &Normal3f) -> bool {
        self.considered += 1;

        if photon.position().has_nans() {
            debug!("Ignoring {} with NaN position", T::KIND);
            return false;
        }

        if self.len() >= self.max_photons {
            if !self.capacity_warned {
                warn!(
                    "{} map is full ({} photons); further photons are dropped",
                    T::KIND,
                    self.max_photons
                );
                self.capacity_warned = true;
            }
            return false;
        }

        let weight = photon.weight() as f64;
        self.offered_weight += weight;

        if let Some(target) = self.policy.target_density(photon.position(), n) {
            self.balance_if_due();

            let current = self.local_density(photon.position());
            let p = acceptance_probability(target, current);
            if !bernoulli(p, self.rng.uniform_float()) {
                self.rejected += 1;
                return self.reject(photon, weight);
            }

            if p < 1.0 && self.policy.rejection() == RejectionPolicy::Reweight {
                photon.scale(1.0 / p);
            }
        }

        self.stored_weight += photon.weight() as f64;
        self.pending.push(photon);
        self.cache_valid = false;
        true
    }

    /// Applies the rejection policy to a photon density control turned away.
    /// The density probe still holds the photon's neighbourhood.
    fn reject(&mut self, photon: T, weight: f64) -> bool {
        if self.policy.rejection() != RejectionPolicy::Merge {
            return false;
        }

        match self.probe.nearest().map(|(i, _)| i) {
            Some(index) => match self.get_mut(index) {
                Some(neighbour) => {
                    neighbour.absorb(&photon);
                    self.stored_weight += weight;
                    self.merged += 1;
                    self.cache_valid = false;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Rebuilds the tree if the pending list has grown too long for linear
    /// scans.
    fn balance_if_due(&mut self) {
        if self.pending.len() >= self.max_pending {
            self.check_and_balance();
        }
    }

    /// Estimates the density of stored photons around a point with the
    /// insertion probe. Every stored photon counts, including classes the
    /// estimate excludes.
    fn local_density(&mut self, p: &Point3f) -> Float {
        let mut probe = mem::take(&mut self.probe);
        self.locate_into(&mut probe, p, self.density_lookup, self.max_dist_sq, PhotonFlags::empty());
        let density = probe_density(&probe, self.max_dist_sq);
        self.probe = probe;
        density
    }

    /// Merges pending photons into the balanced tree. Does nothing if the map
    /// is already balanced.
    pub fn check_and_balance(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let added = self.pending.len();
        let mut photons = mem::take(&mut self.tree).into_vec();
        photons.append(&mut self.pending);
        self.tree = KdTree::build(photons);
        self.balances += 1;

        debug!(
            "Balanced {} map: {} photons ({} new)",
            T::KIND,
            self.tree.len(),
            added
        );
    }

    /// Finds the photons nearest to a point using the shared estimate size and
    /// the configured search radius. Returns the number found; their indices
    /// are in `ctx`.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    pub fn locate(&self, ctx: &mut NearestPhotons, p: &Point3f) -> usize {
        self.locate_into(ctx, p, self.lookup(), self.max_dist_sq, self.exclude)
    }

    /// Finds up to `k` photons within a squared radius of `p`, searching the
    /// tree and the pending list. Photons with a flag in `exclude` are
    /// skipped.
    pub(crate) fn locate_into(
        &self,
        ctx: &mut NearestPhotons,
        p: &Point3f,
        k: usize,
        max_dist_sq: Float,
        exclude: PhotonFlags,
    ) -> usize {
        ctx.reset(k, max_dist_sq);
        self.tree.locate(p, exclude, ctx);

        let base = self.tree.len();
        for (i, photon) in self.pending.iter().enumerate() {
            if !photon.flags().intersects(exclude) {
                ctx.consider(base + i, p.distance_squared(photon.position()));
            }
        }
        ctx.found()
    }

    /// Sums the flux of the photons nearest to a surface point weighted by the
    /// BSDF. Photons arriving from the viewer's side use `bsdf`; photons
    /// arriving through the surface use `in_bsdf` when the viewer is outside
    /// and `out_bsdf` when the viewer is inside, and are skipped when that is
    /// missing.
    ///
    /// * `ctx`      - Query context.
    /// * `hit`      - Surface point.
    /// * `wo`       - Outgoing direction.
    /// * `bsdf`     - Reflection at the surface.
    /// * `in_bsdf`  - Transmission from the inside.
    /// * `out_bsdf` - Transmission from the outside.
    pub fn gather(
        &self,
        ctx: &mut NearestPhotons,
        hit: &SurfaceHit,
        wo: &Vector3f,
        bsdf: &dyn Bsdf,
        in_bsdf: Option<&dyn Bsdf>,
        out_bsdf: Option<&dyn Bsdf>,
    ) -> Gather {
        let found = self.locate(ctx, &hit.p);
        let cos_o = wo.dot(&hit.n);

        let mut flux = Spectrum::ZERO;
        for (index, _) in ctx.iter() {
            let photon = match self.get(index) {
                Some(photon) => photon,
                None => continue,
            };
            let wi = photon.incident();
            let cos_i = wi.dot(&hit.n);
            let f = if cos_i * cos_o > 0.0 {
                Some(bsdf)
            } else if cos_i == 0.0 {
                None
            } else if cos_o > 0.0 {
                in_bsdf
            } else {
                out_bsdf
            };
            if let Some(f) = f {
                flux += photon.flux() * f.f(wo, &wi);
            }
        }

        Gather {
            flux,
            radius_sq: ctx.farthest_dist_sq().unwrap_or(0.0),
            found,
        }
    }

    /// Returns the radiance leaving a surface point estimated from the photons
    /// around it, without rebuilding the tree.
    ///
    /// * `ctx`      - Query context.
    /// * `hit`      - Surface point.
    /// * `wo`       - Outgoing direction.
    /// * `bsdf`     - Reflection at the surface.
    /// * `in_bsdf`  - Transmission from the inside.
    /// * `out_bsdf` - Transmission from the outside.
    pub fn estimate(
        &self,
        ctx: &mut NearestPhotons,
        hit: &SurfaceHit,
        wo: &Vector3f,
        bsdf: &dyn Bsdf,
        in_bsdf: Option<&dyn Bsdf>,
        out_bsdf: Option<&dyn Bsdf>,
    ) -> Spectrum {
        if self.n_paths == 0 {
            debug!("{} map estimate before any path was traced", T::KIND);
            return Spectrum::ZERO;
        }

        let g = self.gather(ctx, hit, wo, bsdf, in_bsdf, out_bsdf);
        if g.found == 0 || g.radius_sq < AREA_EPSILON {
            return Spectrum::ZERO;
        }

        g.flux * (self.compensation() / (disk_area(g.radius_sq) * self.n_paths as Float))
    }

    /// Balances the map if needed and returns the radiance leaving a surface
    /// point.
    ///
    /// * `ctx`      - Query context.
    /// * `hit`      - Surface point.
    /// * `wo`       - Outgoing direction.
    /// * `bsdf`     - Reflection at the surface.
    /// * `in_bsdf`  - Transmission from the inside.
    /// * `out_bsdf` - Transmission from the outside.
    pub fn reconstruct(
        &mut self,
        ctx: &mut NearestPhotons,
        hit: &SurfaceHit,
        wo: &Vector3f,
        bsdf: &dyn Bsdf,
        in_bsdf: Option<&dyn Bsdf>,
        out_bsdf: Option<&dyn Bsdf>,
    ) -> Spectrum {
        self.check_and_balance();
        self.estimate(ctx, hit, wo, bsdf, in_bsdf, out_bsdf)
    }

    /// Returns the number of photons per unit area around a point.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    pub fn density(&self, ctx: &mut NearestPhotons, p: &Point3f) -> Float {
        let found = self.locate(ctx, p);
        match ctx.farthest_dist_sq() {
            Some(r2) if found > 0 && r2 >= AREA_EPSILON => found as Float / disk_area(r2),
            _ => 0.0,
        }
    }

    /// Returns the photon density around a surface point as a false colour
    /// running from blue through cyan, green and yellow to red on a log scale.
    ///
    /// * `ctx` - Query context.
    /// * `hit` - Surface point.
    pub fn density_color(&self, ctx: &mut NearestPhotons, hit: &SurfaceHit) -> Spectrum {
        let density = self.density(ctx, &hit.p);
        if density <= 0.0 {
            return Spectrum::ZERO;
        }
        let t = (1.0 + density).ln() / (1.0 + self.density_scale).ln();
        false_color(clamp(t, 0.0, 1.0))
    }

    /// Returns the factor estimates are scaled by to account for discarded
    /// flux.
    pub fn compensation(&self) -> Float {
        if self.policy.rejection() == RejectionPolicy::Discard && self.stored_weight > 0.0 {
            (self.offered_weight / self.stored_weight) as Float
        } else {
            1.0
        }
    }

    /// Returns the counters of this map.
    pub fn stats(&self) -> PhotonMapStats {
        PhotonMapStats {
            kind: T::KIND,
            stored: self.len(),
            capacity: self.max_photons,
            pending: self.pending.len(),
            considered: self.considered,
            rejected: self.rejected,
            merged: self.merged,
            paths: self.n_paths,
            balances: self.balances,
        }
    }
}

/// Returns the density measured by a filled insertion probe. One or no
/// neighbours count as empty space. A probe that found fewer photons than it
/// asked for covers its whole search radius if that is finite.
///
/// * `probe`       - The probe after a query.
/// * `max_dist_sq` - Squared search radius of the query.
fn probe_density(probe: &NearestPhotons, max_dist_sq: Float) -> Float {
    let found = probe.found();
    if found <= 1 {
        return 0.0;
    }
    let r2 = if !probe.is_full() && max_dist_sq.is_finite() {
        max_dist_sq
    } else {
        probe.farthest_dist_sq().unwrap_or(max_dist_sq)
    };
    if r2 < AREA_EPSILON {
        INFINITY
    } else {
        found as Float / disk_area(r2)
    }
}

/// Maps [0, 1] onto a blue, cyan, green, yellow, red ramp.
///
/// * `t` - Position on the ramp.
fn false_color(t: Float) -> Spectrum {
    const STOPS: [(Float, Float, Float); 5] = [
        (0.0, 0.0, 1.0),
        (0.0, 1.0, 1.0),
        (0.0, 1.0, 0.0),
        (1.0, 1.0, 0.0),
        (1.0, 0.0, 0.0),
    ];
    let s = t * (STOPS.len() - 1) as Float;
    let i = min(s as usize, STOPS.len() - 2);
    let (r0, g0, b0) = STOPS[i];
    let (r1, g1, b1) = STOPS[i + 1];
    lerp(
        s - i as Float,
        Spectrum::from_rgb(r0, g0, b0),
        Spectrum::from_rgb(r1, g1, b1),
    )
}
