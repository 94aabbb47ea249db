//! Irradiance estimates and the per-photon irradiance cache.

use crate::bsdf::*;
use crate::kd_tree::*;
use crate::photon::*;
use crate::photon_map::*;
use photon_core::geometry::*;
use photon_core::pbrt::*;
use photon_core::spectrum::*;

impl<T: PhotonRecord> PhotonMap<T> {
    /// Sums the flux of the photons nearest to `p` that arrive on the side `n`
    /// points to.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    pub fn gather_hemisphere(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> Gather {
        let found = self.locate(ctx, p);
        let flux = ctx
            .iter()
            .filter_map(|(index, _)| self.get(index))
            .filter(|photon| photon.incident().dot(n) > 0.0)
            .map(|photon| photon.flux())
            .sum();
        Gather {
            flux,
            radius_sq: ctx.farthest_dist_sq().unwrap_or(0.0),
            found,
        }
    }

    /// Returns the irradiance at a surface point estimated directly from the
    /// photons around it.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    pub fn irradiance_estimate(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> Spectrum {
        self.irradiance_kernel(ctx, p, n).value
    }

    /// Returns the direct irradiance estimate with the squared radius of the
    /// kernel it used.
    fn irradiance_kernel(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> CachedEstimate<Spectrum> {
        if self.paths() == 0 {
            return CachedEstimate::new(Spectrum::ZERO, 0.0);
        }
        let g = self.gather_hemisphere(ctx, p, n);
        if g.found == 0 || g.radius_sq < AREA_EPSILON {
            return CachedEstimate::new(Spectrum::ZERO, g.radius_sq);
        }
        let e = g.flux * (self.compensation() / (disk_area(g.radius_sq) * self.paths() as Float));
        CachedEstimate::new(e, g.radius_sq)
    }
}

impl PhotonMap<IrradiancePhoton> {
    /// Balances the map and caches the irradiance estimate at every photon.
    ///
    /// * `ctx` - Query context.
    pub fn precompute_irradiance(&mut self, ctx: &mut NearestPhotons) {
        self.check_and_balance();

        let estimates: Vec<CachedEstimate<Spectrum>> = self
            .tree
            .as_slice()
            .iter()
            .map(|ip| self.irradiance_kernel(ctx, &ip.photon.p, &ip.n))
            .collect();
        for (ip, e) in self.tree.iter_mut().zip(estimates) {
            ip.irradiance = Some(e);
        }
        self.cache_valid = true;

        debug!("Cached irradiance at {} photons", self.tree.len());
    }

    /// Returns true if cached irradiance reflects the current photons.
    pub fn has_cached_irradiance(&self) -> bool {
        self.cache_valid
    }

    /// Returns the cached irradiance of the nearest photon facing the same way
    /// as `n`, or a direct estimate if the cache is stale, holds no such
    /// photon, or `p` lies outside that photon's kernel.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    pub fn irradiance(&self, ctx: &mut NearestPhotons, p: &Point3f, n: &Normal3f) -> Spectrum {
        if self.cache_valid {
            let cached = self
                .tree
                .nearest_oriented(p, n, self.normal_cosine, self.max_dist_sq)
                .and_then(|(index, dist_sq)| {
                    self.tree
                        .get(index)
                        .and_then(|ip| ip.irradiance)
                        .and_then(|e| e.covering(dist_sq))
                });
            if let Some(e) = cached {
                return e;
            }
        }
        self.irradiance_estimate(ctx, p, n)
    }

    /// Returns the radiance leaving a diffuse surface point computed from its
    /// irradiance.
    ///
    /// * `ctx`  - Query context.
    /// * `hit`  - Surface point.
    /// * `wo`   - Outgoing direction.
    /// * `bsdf` - Diffuse reflection at the surface.
    pub fn reconstruct_diffuse(
        &self,
        ctx: &mut NearestPhotons,
        hit: &SurfaceHit,
        wo: &Vector3f,
        bsdf: &dyn Bsdf,
    ) -> Spectrum {
        let n = hit.n.face_forward(wo);
        let e = self.irradiance(ctx, &hit.p, &n);
        if e.is_black() {
            return e;
        }
        e * bsdf.f(wo, &Vector3f::from(n))
    }
}
