//! Common

use num_traits::Num;
use std::ops::{Add, Mul, Neg};

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// PI (π)
pub const PI: Float = std::f32::consts::PI;

/// 1/PI (1/π)
pub const INV_PI: Float = 1.0 / PI;

/// 2*PI (2π)
pub const TWO_PI: Float = PI * 2.0;

/// 1/2*PI (1/2π)
pub const INV_TWO_PI: Float = 1.0 / TWO_PI;

/// PI/4 (π/4)
pub const PI_OVER_FOUR: Float = PI * 0.25;

/// PI/2 (π/2)
pub const PI_OVER_TWO: Float = PI * 0.5;

/// Smallest kernel area (squared radius) an estimate is allowed to divide by.
pub const AREA_EPSILON: Float = 1e-8;

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Returns the minimum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Linearly interpolate between two points for parameters in [0, 1] and
/// extrapolate for parameters outside that interval.
///
/// * `t` - Parameter.
/// * `p0` - Point at t=0.
/// * `p1` - Point at t=1.
#[inline(always)]
pub fn lerp<P>(t: Float, p0: P, p1: P) -> P
where
    Float: Mul<P, Output = P>,
    P: Add<P, Output = P>,
{
    (1.0 - t) * p0 + t * p1
}

/// Returns the area of a disk with the given squared radius.
///
/// * `radius_sq` - Squared radius.
#[inline(always)]
pub fn disk_area(radius_sq: Float) -> Float {
    PI * radius_sq
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn min_max_abs() {
        assert_eq!(min(1, 2), 1);
        assert_eq!(max(1.0, -2.0), 1.0);
        assert_eq!(abs(-3), 3);
    }

    #[test]
    fn lerp_endpoints() {
        assert!(approx_eq!(Float, lerp(0.0, 2.0, 4.0), 2.0));
        assert!(approx_eq!(Float, lerp(1.0, 2.0, 4.0), 4.0));
        assert!(approx_eq!(Float, lerp(0.5, 2.0, 4.0), 3.0));
    }

    #[test]
    fn unit_disk_area() {
        assert!(approx_eq!(Float, disk_area(1.0), PI));
    }
}
