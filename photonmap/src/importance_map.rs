//! Importance Map

use crate::kd_tree::*;
use crate::photon::*;
use crate::photon_map::*;
use crate::policy::*;
use crate::settings::*;
use crate::stats::*;
use photon_core::geometry::*;
use photon_core::pbrt::*;
use std::sync::Arc;

/// A photon map of importons traced from the camera. Its reconstructed
/// importance tells light tracing how densely photons are needed.
pub struct ImportanceMap {
    /// The importons.
    map: PhotonMap<Importon>,

    /// Settings.
    settings: ImportanceSettings,
}

impl ImportanceMap {
    /// Create a new `ImportanceMap`.
    ///
    /// * `map_settings` - Settings of the underlying photon map.
    /// * `settings`     - Importance settings.
    /// * `lookup`       - Shared number of importons per estimate.
    pub fn new(map_settings: &PhotonMapSettings, settings: ImportanceSettings, lookup: SharedLookup) -> Self {
        Self {
            map: PhotonMap::new(map_settings, lookup),
            settings,
        }
    }

    /// Returns the underlying photon map.
    pub fn map(&self) -> &PhotonMap<Importon> {
        &self.map
    }

    /// Returns the settings.
    pub fn settings(&self) -> &ImportanceSettings {
        &self.settings
    }

    /// Offers an importon and returns whether it was stored.
    ///
    /// * `importon` - The importon.
    pub fn add_importon(&mut self, importon: Importon) -> bool {
        let n = importon.n;
        self.map.add_photon(importon, &n)
    }

    /// Records one traced eye path.
    pub fn add_path(&mut self) {
        self.map.add_path();
    }

    /// Records several traced eye paths.
    ///
    /// * `n` - Number of paths.
    pub fn add_paths(&mut self, n: u64) {
        self.map.add_paths(n);
    }

    /// Merges pending importons into the tree and, if enabled, caches the
    /// reconstructed importance at every importon.
    pub fn check_and_balance(&mut self) {
        let was_balanced = self.map.is_balanced();
        self.map.check_and_balance();
        if self.settings.precompute && !(was_balanced && self.map.cache_valid) {
            let mut ctx = NearestPhotons::default();
            self.precompute_irradiance(&mut ctx);
        }
    }

    /// Balances the map and caches the reconstructed importance at every
    /// importon.
    ///
    /// * `ctx` - Query context.
    pub fn precompute_irradiance(&mut self, ctx: &mut NearestPhotons) {
        self.map.check_and_balance();

        let potentials: Vec<CachedEstimate<Float>> = self
            .map
            .tree
            .as_slice()
            .iter()
            .map(|imp| self.importance_kernel(ctx, &imp.p, &imp.n))
            .collect();
        for (imp, w) in self.map.tree.iter_mut().zip(potentials) {
            imp.potential = Some(w);
        }
        self.map.cache_valid = true;

        debug!("Cached importance at {} importons", self.map.len());
    }

    /// Returns true if cached importance reflects the current importons.
    pub fn has_cached_potential(&self) -> bool {
        self.map.cache_valid
    }

    /// Returns the importance at a surface point estimated directly from the
    /// importons around it. Fewer than the configured minimum of importons
    /// give zero.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    pub fn reconstruct_importance(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> Float {
        self.importance_kernel(ctx, p, n).value
    }

    /// Returns the direct importance estimate with the squared radius of the
    /// kernel it used.
    fn importance_kernel(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> CachedEstimate<Float> {
        let paths = self.map.paths();
        if paths == 0 {
            return CachedEstimate::new(0.0, 0.0);
        }
        let g = self.map.gather_hemisphere(ctx, p, n);
        if g.found < self.settings.min_importons || g.radius_sq < AREA_EPSILON {
            return CachedEstimate::new(0.0, g.radius_sq);
        }
        let w = g.flux[0] * self.map.compensation() / (disk_area(g.radius_sq) * paths as Float);
        CachedEstimate::new(w, g.radius_sq)
    }

    /// Returns the cached importance of the nearest importon facing the same
    /// way as `n`, or a direct estimate if the cache is stale, holds no such
    /// importon, or `p` lies outside that importon's kernel.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    pub fn potential(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> Float {
        if self.map.cache_valid {
            let cached = self
                .map
                .tree
                .nearest_oriented(p, n, self.map.normal_cosine, self.map.max_dist_sq)
                .and_then(|(index, dist_sq)| {
                    self.map
                        .tree
                        .get(index)
                        .and_then(|imp| imp.potential)
                        .and_then(|w| w.covering(dist_sq))
                });
            if let Some(w) = cached {
                return w;
            }
        }
        self.reconstruct_importance(ctx, p, n)
    }

    /// Returns the photon density in photons per unit area a surface point
    /// needs so that each pixel it covers receives the configured number of
    /// photons. Never less than the configured minimum density.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    pub fn required_density(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> Float {
        let w = self.potential(ctx, p, n);
        let density = w * self.settings.photons_per_pixel / self.settings.pixel_area();
        max(density, self.settings.min_density)
    }

    /// Returns the counters of the underlying map.
    pub fn stats(&self) -> PhotonMapStats {
        self.map.stats()
    }
}

/// Density target read from a shared importance map. Each target owns its own
/// query context.
pub struct ImportanceTarget {
    /// The importance map.
    map: Arc<ImportanceMap>,

    /// Query context.
    ctx: NearestPhotons,
}

impl ImportanceTarget {
    /// Create a new `ImportanceTarget`.
    ///
    /// * `map` - The importance map.
    pub fn new(map: Arc<ImportanceMap>) -> Self {
        Self {
            map,
            ctx: NearestPhotons::default(),
        }
    }
}

impl DensityTarget for ImportanceTarget {
    fn required_density(&mut self, p: &Point3f, n: &Normal3f) -> Float {
        self.map.required_density(&mut self.ctx, p, n)
    }
}

/// Returns a density control policy driven by an importance map.
///
/// * `map`       - The importance map.
/// * `rejection` - Handling of rejected photons.
pub fn importance_policy(map: &Arc<ImportanceMap>, rejection: RejectionPolicy) -> Box<dyn InsertionPolicy> {
    Box::new(DensityControl::new(
        Box::new(ImportanceTarget::new(Arc::clone(map))),
        rejection,
    ))
}
