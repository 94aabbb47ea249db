//! Common geometry operations.

use super::{Normal3f, Vector3f};
use crate::pbrt::*;

/// Interface for computing dot products.
pub trait Dot<T> {
    type Output;

    /// Returns the dot product.
    ///
    /// * `other` - The other value.
    fn dot(&self, other: &T) -> Self::Output;
}

/// Builds an orthonormal basis around the unit vector `v1` and returns the
/// two remaining axes.
///
/// * `v1` - The first unit vector of the basis.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if abs(v1.x) > abs(v1.y) {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}

/// Converts a direction given in the local frame of a surface normal into
/// world space.
///
/// * `local` - Direction whose z-axis is aligned with `n`.
/// * `n`     - Unit surface normal.
pub fn local_to_world(local: &Vector3f, n: &Normal3f) -> Vector3f {
    let w = Vector3f::from(*n);
    let (u, v) = coordinate_system(&w);
    u * local.x + v * local.y + w * local.z
}

/// Converts a world space direction into the local frame of a surface normal.
///
/// * `world` - World space direction.
/// * `n`     - Unit surface normal.
pub fn world_to_local(world: &Vector3f, n: &Normal3f) -> Vector3f {
    let w = Vector3f::from(*n);
    let (u, v) = coordinate_system(&w);
    Vector3f::new(world.dot(&u), world.dot(&v), world.dot(&w))
}

/// Returns the azimuth of a local direction in [0, 2π).
///
/// * `v` - Direction in a local frame.
pub fn spherical_phi(v: &Vector3f) -> Float {
    let p = v.y.atan2(v.x);
    if p < 0.0 {
        p + TWO_PI
    } else {
        p
    }
}
