//! Surface scattering interface used by reconstruction.

use photon_core::geometry::*;
use photon_core::pbrt::*;
use photon_core::spectrum::*;

/// Evaluates how light arriving from one direction scatters into another.
pub trait Bsdf {
    /// Returns the value of the distribution function for the given pair of
    /// world space directions, both pointing away from the surface.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum;
}

/// Point on a surface a reconstruction is evaluated at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurfaceHit {
    /// Position.
    pub p: Point3f,

    /// Unit surface normal.
    pub n: Normal3f,
}

impl SurfaceHit {
    /// Create a new `SurfaceHit`.
    ///
    /// * `p` - Position.
    /// * `n` - Unit surface normal.
    pub fn new(p: Point3f, n: Normal3f) -> Self {
        Self { p, n }
    }
}

/// Ideal diffuse reflection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lambertian {
    /// Reflectance.
    pub r: Spectrum,
}

impl Lambertian {
    /// Create a new `Lambertian`.
    ///
    /// * `r` - Reflectance.
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }
}

impl Bsdf for Lambertian {
    fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        self.r * INV_PI
    }
}
