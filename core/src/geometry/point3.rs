//! 3-D Points

use super::Vector3;
use crate::pbrt::*;
use num_traits::{Num, Zero};
use std::fmt;
use std::ops::{Add, Index, Sub};

/// A 3-D point containing numeric values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D point containing `Float` values.
pub type Point3f = Point3<Float>;

impl<T: Num> Point3<T> {
    /// Creates a new 3-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a new 3-D point at the origin.
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

    /// Returns the squared distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance_squared(&self, other: &Self) -> T
    where
        T: Copy,
    {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Returns the distance to another point.
    ///
    /// * `other` - The other point.
    pub fn distance(&self, other: &Self) -> T
    where
        T: num_traits::Float,
    {
        self.distance_squared(other).sqrt()
    }
}

impl<T: Num> Add<Vector3<T>> for Point3<T> {
    type Output = Point3<T>;

    /// Offsets the point by a vector.
    ///
    /// * `v` - The vector.
    fn add(self, v: Vector3<T>) -> Self::Output {
        Point3::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl<T: Num> Sub for Point3<T> {
    type Output = Vector3<T>;

    /// Returns the vector from `other` to this point.
    ///
    /// * `other` - The starting point.
    fn sub(self, other: Self) -> Self::Output {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T> Index<Axis> for Point3<T> {
    type Output = T;

    /// Index the point by an axis to get the immutable coordinate axis value.
    ///
    /// * `axis` - A 3-D coordinate axis.
    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;

    /// Index the point by an axis number.
    ///
    /// * `index` - 0, 1 or 2.
    fn index(&self, index: usize) -> &Self::Output {
        &self[Axis::from(index)]
    }
}

impl<T: fmt::Display> fmt::Display for Point3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
