//! 3-D normals

use super::{Dot, Vector3};
use crate::pbrt::*;
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Div, Mul, Neg};

/// A 3-D normal containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Normal3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D normal containing `Float` values.
pub type Normal3f = Normal3<Float>;

impl<T: Num> Normal3<T> {
    /// Creates a new 3-D normal.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a new 3-D zero normal.
    pub fn zero() -> Self
    where
        T: Zero,
    {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool
    where
        T: num_traits::Float,
    {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the square of the normal's length.
    pub fn length_squared(&self) -> T
    where
        T: Copy,
    {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the normal's length.
    pub fn length(&self) -> T
    where
        T: num_traits::Float,
    {
        self.length_squared().sqrt()
    }

    /// Returns the unit normal.
    pub fn normalize(&self) -> Self
    where
        T: num_traits::Float,
    {
        *self / self.length()
    }

    /// Flips the normal so that it lies in the same hemisphere as the given
    /// vector.
    ///
    /// * `v` - The reference vector.
    pub fn face_forward(&self, v: &Vector3<T>) -> Self
    where
        T: Neg<Output = T> + PartialOrd + Copy,
    {
        if self.dot(v) < T::zero() {
            -*self
        } else {
            *self
        }
    }
}

impl<T: Num + Copy> Dot<Normal3<T>> for Normal3<T> {
    type Output = T;

    /// Returns the dot product with another normal.
    ///
    /// * `other` - The other normal.
    fn dot(&self, other: &Self) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl<T: Num + Copy> Dot<Vector3<T>> for Normal3<T> {
    type Output = T;

    /// Returns the dot product with a vector.
    ///
    /// * `other` - The vector.
    fn dot(&self, other: &Vector3<T>) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl<T: Num + Copy> Mul<T> for Normal3<T> {
    type Output = Self;

    fn mul(self, f: T) -> Self::Output {
        Self::new(self.x * f, self.y * f, self.z * f)
    }
}

impl<T: Num + Copy> Div<T> for Normal3<T> {
    type Output = Self;

    fn div(self, f: T) -> Self::Output {
        debug_assert!(!f.is_zero());
        Self::new(self.x / f, self.y / f, self.z / f)
    }
}

impl<T: Num + Neg<Output = T>> Neg for Normal3<T> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T> From<Vector3<T>> for Normal3<T> {
    /// Convert a 3-D vector to a 3-D normal.
    ///
    /// * `v` - 3-D vector.
    fn from(v: Vector3<T>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl<T: fmt::Display> fmt::Display for Normal3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3f;
    use proptest::prelude::*;

    fn normal3_f32() -> impl Strategy<Value = Normal3f> {
        (-100.0..100.0f32, -100.0..100.0f32, -100.0..100.0f32).prop_map(|(x, y, z)| Normal3f::new(x, y, z))
    }

    #[test]
    fn zero_normal() {
        assert!(Normal3::new(0.0, 0.0, 0.0) == Normal3::zero());
    }

    #[test]
    fn face_forward_flips() {
        let n = Normal3f::new(0.0, 0.0, 1.0);
        assert_eq!(n.face_forward(&Vector3f::new(0.0, 0.0, -1.0)), Normal3f::new(-0.0, -0.0, -1.0));
        assert_eq!(n.face_forward(&Vector3f::new(0.0, 1.0, 1.0)), n);
    }

    proptest! {
        #[test]
        fn dot_f32(n1 in normal3_f32(), n2 in normal3_f32()) {
            prop_assert_eq!(n1.dot(&n2), n1.x * n2.x + n1.y * n2.y + n1.z * n2.z);
        }

        #[test]
        fn face_forward_is_never_opposed(n in normal3_f32(), v in normal3_f32()) {
            let v = Vector3f::from(v);
            prop_assert!(n.face_forward(&v).dot(&v) >= 0.0);
        }
    }
}
