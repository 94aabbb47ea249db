//! Direction guiding from stored photons.

use crate::kd_tree::*;
use crate::photon::*;
use crate::photon_map::*;
use photon_core::geometry::*;
use photon_core::pbrt::*;
use photon_core::sampling::*;

/// A distribution over the hemisphere around a surface normal, tabulated from
/// the incident directions of nearby photons. Cells are uniform in
/// (cos θ, φ / 2π), which makes them equal in solid angle.
#[derive(Clone, Debug)]
pub struct GuidedDirection {
    /// Tabulated flux over (cos θ, φ / 2π).
    grid: SampleGrid,

    /// Unit surface normal.
    n: Normal3f,
}

impl GuidedDirection {
    /// Returns the underlying grid.
    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    /// Samples a world space direction on the normal's side and returns it
    /// with its solid angle pdf.
    ///
    /// * `u` - Uniform random sample.
    pub fn sample(&self, u: &Point2f) -> (Vector3f, Float) {
        let (xy, pdf) = self.grid.sample(u);
        let cos_theta = xy.x;
        let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
        let phi = xy.y * TWO_PI;
        let local = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        (local_to_world(&local, &self.n), pdf * INV_TWO_PI)
    }

    /// Returns the solid angle pdf of sampling a world space direction.
    ///
    /// * `w` - Unit direction.
    pub fn pdf(&self, w: &Vector3f) -> Float {
        let local = world_to_local(w, &self.n);
        if local.z <= 0.0 {
            return 0.0;
        }
        let xy = Point2f::new(local.z, spherical_phi(&local) * INV_TWO_PI);
        self.grid.pdf(&xy) * INV_TWO_PI
    }
}

impl<T: PhotonRecord> PhotonMap<T> {
    /// Bins the incident directions of the photons nearest to a surface point,
    /// weighted by their luminance, into a direction distribution. Every
    /// direction keeps a small non-zero probability.
    ///
    /// * `ctx` - Query context.
    /// * `p`   - Query point.
    /// * `n`   - Unit surface normal at `p`.
    /// * `nu`  - Number of cos θ bins.
    /// * `nv`  - Number of φ bins.
    pub fn direction_grid(
        &self,
        ctx: &mut NearestPhotons,
        p: &Point3f,
        n: &Normal3f,
        nu: usize,
        nv: usize,
    ) -> Result<GuidedDirection, String> {
        let mut grid = SampleGrid::new(nu, nv)?;

        self.locate(ctx, p);
        for (index, _) in ctx.iter() {
            if let Some(photon) = self.get(index) {
                let local = world_to_local(&photon.incident(), n);
                if local.z > 0.0 {
                    grid.add(local.z, spherical_phi(&local) * INV_TWO_PI, photon.flux().y());
                }
            }
        }
        grid.ensure_non_zero_entries();

        Ok(GuidedDirection { grid, n: *n })
    }
}
