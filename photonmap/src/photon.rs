//! Photon records.

use bitflags::bitflags;
use photon_core::geometry::*;
use photon_core::pbrt::*;
use photon_core::spectrum::*;
use std::fmt;

bitflags! {
    /// Classifies how a photon reached the surface it was deposited on.
    /// Queries skip photons whose flags intersect their exclusion mask.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PhotonFlags: u8 {
        /// Deposited straight from the light source.
        const DIRECT = 1;
        /// Deposited after one or more diffuse bounces.
        const INDIRECT = 2;
        /// Deposited after a specular chain starting at the light.
        const CAUSTIC = 4;
        /// Deposited inside participating media.
        const VOLUME = 8;
    }
}

/// The kinds of records a photon map can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhotonKind {
    /// Position, power and direction.
    Plain,

    /// A photon with a surface normal and a cached irradiance estimate.
    Irradiance,

    /// A camera-side sample carrying scalar importance.
    Importance,
}

impl fmt::Display for PhotonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotonKind::Plain => write!(f, "photon"),
            PhotonKind::Irradiance => write!(f, "irradiance photon"),
            PhotonKind::Importance => write!(f, "importon"),
        }
    }
}

/// Interface shared by all records stored in a `PhotonMap`.
pub trait PhotonRecord: Clone + Send + Sync {
    /// The kind of record.
    const KIND: PhotonKind;

    /// Returns the position the record was deposited at.
    fn position(&self) -> &Point3f;

    /// Returns the propagation direction of the sample, pointing towards the
    /// surface it was deposited on.
    fn direction(&self) -> &Vector3f;

    /// Returns the classification flags.
    fn flags(&self) -> PhotonFlags;

    /// Returns the flux carried by the record. Importons report their scalar
    /// importance in every channel.
    fn flux(&self) -> Spectrum;

    /// Returns a scalar magnitude used for energy bookkeeping.
    fn weight(&self) -> Float;

    /// Scales the carried flux.
    ///
    /// * `s` - The scale factor.
    fn scale(&mut self, s: Float);

    /// Adds the flux of another record to this one.
    ///
    /// * `other` - The record being merged in.
    fn absorb(&mut self, other: &Self);

    /// Returns the direction towards where the sample came from.
    fn incident(&self) -> Vector3f {
        -*self.direction()
    }
}

/// Records that know the surface normal at their position.
pub trait Oriented {
    /// Returns the surface normal.
    fn normal(&self) -> &Normal3f;
}

/// A sample of radiant flux.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Photon {
    /// Position.
    pub p: Point3f,

    /// Flux carried.
    pub power: Spectrum,

    /// Propagation direction.
    pub dir: Vector3f,

    /// Classification flags.
    pub flags: PhotonFlags,
}

impl Photon {
    /// Create a new `Photon`.
    ///
    /// * `p`     - Position.
    /// * `power` - Flux carried.
    /// * `dir`   - Propagation direction.
    /// * `flags` - Classification flags.
    pub fn new(p: Point3f, power: Spectrum, dir: Vector3f, flags: PhotonFlags) -> Self {
        Self { p, power, dir, flags }
    }
}

impl PhotonRecord for Photon {
    const KIND: PhotonKind = PhotonKind::Plain;

    fn position(&self) -> &Point3f {
        &self.p
    }

    fn direction(&self) -> &Vector3f {
        &self.dir
    }

    fn flags(&self) -> PhotonFlags {
        self.flags
    }

    fn flux(&self) -> Spectrum {
        self.power
    }

    fn weight(&self) -> Float {
        self.power.y()
    }

    fn scale(&mut self, s: Float) {
        self.power *= s;
    }

    fn absorb(&mut self, other: &Self) {
        self.power += other.power;
    }
}

/// An estimate cached at a stored record together with the squared radius of
/// the kernel it was gathered over.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CachedEstimate<V> {
    /// The estimate.
    pub value: V,

    /// Squared kernel radius.
    pub radius_sq: Float,
}

impl<V: Copy> CachedEstimate<V> {
    /// Create a new `CachedEstimate`.
    ///
    /// * `value`     - The estimate.
    /// * `radius_sq` - Squared kernel radius.
    pub fn new(value: V, radius_sq: Float) -> Self {
        Self { value, radius_sq }
    }

    /// Returns the estimate if a query `dist_sq` away from the record still
    /// lies inside its kernel.
    ///
    /// * `dist_sq` - Squared distance of the query point to the record.
    pub fn covering(&self, dist_sq: Float) -> Option<V> {
        if dist_sq <= self.radius_sq {
            Some(self.value)
        } else {
            None
        }
    }
}

/// A photon that also stores the surface normal and, once computed, the
/// irradiance estimated at its position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IrradiancePhoton {
    /// The underlying photon.
    pub photon: Photon,

    /// Surface normal.
    pub n: Normal3f,

    /// Cached irradiance.
    pub irradiance: Option<CachedEstimate<Spectrum>>,
}

impl IrradiancePhoton {
    /// Create a new `IrradiancePhoton` with an empty cache.
    ///
    /// * `photon` - The photon.
    /// * `n`      - Surface normal at the photon position.
    pub fn new(photon: Photon, n: Normal3f) -> Self {
        Self {
            photon,
            n,
            irradiance: None,
        }
    }
}

impl PhotonRecord for IrradiancePhoton {
    const KIND: PhotonKind = PhotonKind::Irradiance;

    fn position(&self) -> &Point3f {
        &self.photon.p
    }

    fn direction(&self) -> &Vector3f {
        &self.photon.dir
    }

    fn flags(&self) -> PhotonFlags {
        self.photon.flags
    }

    fn flux(&self) -> Spectrum {
        self.photon.power
    }

    fn weight(&self) -> Float {
        self.photon.weight()
    }

    fn scale(&mut self, s: Float) {
        self.photon.scale(s);
        self.irradiance = None;
    }

    fn absorb(&mut self, other: &Self) {
        self.photon.absorb(&other.photon);
        self.irradiance = None;
    }
}

impl Oriented for IrradiancePhoton {
    fn normal(&self) -> &Normal3f {
        &self.n
    }
}

/// A camera-side sample. `importance` is what the eye path deposited;
/// `potential` caches the importance reconstructed at this position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Importon {
    /// Position.
    pub p: Point3f,

    /// Propagation direction of the eye path.
    pub dir: Vector3f,

    /// Surface normal.
    pub n: Normal3f,

    /// Classification flags.
    pub flags: PhotonFlags,

    /// Importance carried.
    pub importance: Float,

    /// Cached reconstructed importance.
    pub potential: Option<CachedEstimate<Float>>,
}

impl Importon {
    /// Create a new `Importon` with an empty cache.
    ///
    /// * `p`          - Position.
    /// * `dir`        - Propagation direction of the eye path.
    /// * `n`          - Surface normal.
    /// * `importance` - Importance carried.
    /// * `flags`      - Classification flags.
    pub fn new(p: Point3f, dir: Vector3f, n: Normal3f, importance: Float, flags: PhotonFlags) -> Self {
        Self {
            p,
            dir,
            n,
            flags,
            importance,
            potential: None,
        }
    }
}

impl PhotonRecord for Importon {
    const KIND: PhotonKind = PhotonKind::Importance;

    fn position(&self) -> &Point3f {
        &self.p
    }

    fn direction(&self) -> &Vector3f {
        &self.dir
    }

    fn flags(&self) -> PhotonFlags {
        self.flags
    }

    fn flux(&self) -> Spectrum {
        Spectrum::new(self.importance)
    }

    fn weight(&self) -> Float {
        self.importance
    }

    fn scale(&mut self, s: Float) {
        self.importance *= s;
        self.potential = None;
    }

    fn absorb(&mut self, other: &Self) {
        self.importance += other.importance;
        self.potential = None;
    }
}

impl Oriented for Importon {
    fn normal(&self) -> &Normal3f {
        &self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photon() -> Photon {
        Photon::new(
            Point3f::new(1.0, 2.0, 3.0),
            Spectrum::from_rgb(1.0, 0.5, 0.25),
            Vector3f::new(0.0, 0.0, -1.0),
            PhotonFlags::INDIRECT,
        )
    }

    #[test]
    fn incident_is_reversed_direction() {
        assert_eq!(photon().incident(), Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn absorb_sums_power() {
        let mut a = photon();
        a.absorb(&photon());
        assert_eq!(a.power, Spectrum::from_rgb(2.0, 1.0, 0.5));
    }

    #[test]
    fn scaling_invalidates_caches() {
        let mut ip = IrradiancePhoton::new(photon(), Normal3f::new(0.0, 0.0, 1.0));
        ip.irradiance = Some(CachedEstimate::new(Spectrum::ONE, 0.25));
        ip.scale(2.0);
        assert!(ip.irradiance.is_none());
        assert_eq!(ip.flux(), Spectrum::from_rgb(2.0, 1.0, 0.5));

        let mut imp = Importon::new(
            Point3f::zero(),
            Vector3f::new(0.0, 0.0, -1.0),
            Normal3f::new(0.0, 0.0, 1.0),
            0.5,
            PhotonFlags::DIRECT,
        );
        imp.potential = Some(CachedEstimate::new(1.0, 0.25));
        let other = imp;
        imp.absorb(&other);
        assert_eq!(imp.importance, 1.0);
        assert!(imp.potential.is_none());
        assert_eq!(imp.flux(), Spectrum::new(1.0));
    }

    #[test]
    fn cached_estimates_cover_their_kernel() {
        let e = CachedEstimate::new(2.0, 0.25);
        assert_eq!(e.covering(0.0), Some(2.0));
        assert_eq!(e.covering(0.25), Some(2.0));
        assert_eq!(e.covering(0.26), None);
        assert_eq!(CachedEstimate::new(1.0, 0.0).covering(1e-6), None);
    }

    #[test]
    fn kinds() {
        assert_eq!(Photon::KIND, PhotonKind::Plain);
        assert_eq!(IrradiancePhoton::KIND, PhotonKind::Irradiance);
        assert_eq!(Importon::KIND, PhotonKind::Importance);
        assert_eq!(Importon::KIND.to_string(), "importon");
    }

    #[test]
    fn flags_intersect() {
        let exclude = PhotonFlags::DIRECT | PhotonFlags::VOLUME;
        assert!(!photon().flags().intersects(exclude));
        assert!(PhotonFlags::DIRECT.intersects(exclude));
    }
}
