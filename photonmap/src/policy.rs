//! Insertion policies.

use photon_core::geometry::*;
use photon_core::pbrt::*;
use std::fmt;

/// Densities at or below this are treated as empty space.
pub const DENSITY_EPSILON: Float = 1e-12;

/// Supplies the photon density a store should aim for at a surface point.
pub trait DensityTarget: Send + Sync {
    /// Returns the required density in photons per unit area.
    ///
    /// * `p` - Surface point.
    /// * `n` - Unit surface normal at `p`.
    fn required_density(&mut self, p: &Point3f, n: &Normal3f) -> Float;
}

/// A target density that is the same everywhere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantDensity(pub Float);

impl DensityTarget for ConstantDensity {
    fn required_density(&mut self, _p: &Point3f, _n: &Normal3f) -> Float {
        self.0
    }
}

/// What happens to the flux of a photon that density control turns away.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RejectionPolicy {
    /// Drop the photon. Reconstruction scales estimates by the ratio of offered
    /// to stored flux.
    Discard,

    /// Add the photon's flux to the closest stored photon.
    Merge,

    /// Drop the photon but store accepted photons with their flux divided by
    /// the acceptance probability.
    #[default]
    Reweight,
}

impl fmt::Display for RejectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionPolicy::Discard => write!(f, "discard"),
            RejectionPolicy::Merge => write!(f, "merge"),
            RejectionPolicy::Reweight => write!(f, "reweight"),
        }
    }
}

impl TryFrom<&str> for RejectionPolicy {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "discard" => Ok(RejectionPolicy::Discard),
            "merge" => Ok(RejectionPolicy::Merge),
            "reweight" => Ok(RejectionPolicy::Reweight),
            _ => Err(format!("Unknown rejection policy '{}'", s)),
        }
    }
}

/// Decides whether a photon offered to a store is subject to density control.
pub trait InsertionPolicy: Send + Sync {
    /// Returns the target density at a point, or `None` to store the photon
    /// unconditionally.
    ///
    /// * `p` - Photon position.
    /// * `n` - Unit surface normal at `p`.
    fn target_density(&mut self, p: &Point3f, n: &Normal3f) -> Option<Float>;

    /// Returns how rejected photons are handled.
    fn rejection(&self) -> RejectionPolicy;

    /// Returns a short name for logging.
    fn name(&self) -> &'static str;
}

/// Stores every photon.
#[derive(Copy, Clone, Debug, Default)]
pub struct StoreAll;

impl InsertionPolicy for StoreAll {
    fn target_density(&mut self, _p: &Point3f, _n: &Normal3f) -> Option<Float> {
        None
    }

    fn rejection(&self) -> RejectionPolicy {
        RejectionPolicy::Discard
    }

    fn name(&self) -> &'static str {
        "all"
    }
}

/// Accepts photons with a probability that drives the local density towards a
/// target.
pub struct DensityControl {
    /// The density to aim for.
    target: Box<dyn DensityTarget>,

    /// Handling of rejected photons.
    rejection: RejectionPolicy,
}

impl DensityControl {
    /// Create a new `DensityControl`.
    ///
    /// * `target`    - The density to aim for.
    /// * `rejection` - Handling of rejected photons.
    pub fn new(target: Box<dyn DensityTarget>, rejection: RejectionPolicy) -> Self {
        Self { target, rejection }
    }
}

impl InsertionPolicy for DensityControl {
    fn target_density(&mut self, p: &Point3f, n: &Normal3f) -> Option<Float> {
        Some(self.target.required_density(p, n))
    }

    fn rejection(&self) -> RejectionPolicy {
        self.rejection
    }

    fn name(&self) -> &'static str {
        "density"
    }
}

/// Returns the probability of accepting a photon where the stored density is
/// `current` and the desired density is `target`. Always in [0, 1].
///
/// * `target`  - Desired density.
/// * `current` - Estimated density of stored photons.
pub fn acceptance_probability(target: Float, current: Float) -> Float {
    if !(current > DENSITY_EPSILON) {
        // Nothing stored nearby.
        return 1.0;
    }
    clamp_probability(target / current)
}
