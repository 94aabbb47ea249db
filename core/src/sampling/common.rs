//! Common sampling functions.

use crate::geometry::*;
use crate::pbrt::*;

/// Uniformly sample a direction on the unit sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[0];
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Sample a point on the unit disk using Shirley's concentric mapping.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let u_offset = Point2f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0);

    // Handle degeneracy at the origin.
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    // Apply concentric mapping to point.
    let (r, theta) = if abs(u_offset.x) > abs(u_offset.y) {
        (u_offset.x, PI_OVER_FOUR * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, PI_OVER_TWO - PI_OVER_FOUR * (u_offset.x / u_offset.y))
    };
    Point2f::new(r * theta.cos(), r * theta.sin())
}
