//! RGB Spectrum.

use crate::pbrt::*;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Index, Mul, MulAssign, Sub};

/// Number of spectral samples to use for `RGBSpectrum`.
pub const RGB_SAMPLES: usize = 3;

/// RGBSpectrum represents an spectral power distribution (SPD) with
/// a weighted sum of red, green and blue components.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// The sampled spectral values.
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Black.
    pub const ZERO: Self = Self { c: [0.0; RGB_SAMPLES] };

    /// Unit value in every channel.
    pub const ONE: Self = Self { c: [1.0; RGB_SAMPLES] };

    /// Create a new `RGBSpectrum` with a constant value across all
    /// wavelengths.
    ///
    /// * `v` - Constant value.
    pub fn new(v: Float) -> Self {
        Self { c: [v; RGB_SAMPLES] }
    }

    /// Create a new `RGBSpectrum` from red, green and blue components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the y-coefficient of XYZ colour.
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Returns true if the values are zero everywhere.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns the largest channel value.
    pub fn max_component_value(&self) -> Float {
        self.c.iter().fold(-INFINITY, |a, b| max(a, *b))
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::from_rgb(self.c[0] + other.c[0], self.c[1] + other.c[1], self.c[2] + other.c[2])
    }
}

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, other: Self) {
        for (a, b) in self.c.iter_mut().zip(other.c.iter()) {
            *a += b;
        }
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::from_rgb(self.c[0] - other.c[0], self.c[1] - other.c[1], self.c[2] - other.c[2])
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        Self::from_rgb(self.c[0] * other.c[0], self.c[1] * other.c[1], self.c[2] * other.c[2])
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, f: Float) -> Self::Output {
        Self::from_rgb(self.c[0] * f, self.c[1] * f, self.c[2] * f)
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, f: Float) {
        for a in self.c.iter_mut() {
            *a *= f;
        }
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        self * inv
    }
}

impl Sum for RGBSpectrum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for RGBSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn luminance_of_white_is_one() {
        assert!(approx_eq!(Float, RGBSpectrum::ONE.y(), 1.0, epsilon = 1e-5));
    }

    #[test]
    fn black_and_nans() {
        assert!(RGBSpectrum::ZERO.is_black());
        assert!(!RGBSpectrum::new(0.1).is_black());
        assert!(RGBSpectrum::from_rgb(Float::NAN, 0.0, 0.0).has_nans());
    }

    #[test]
    fn arithmetic() {
        let a = RGBSpectrum::from_rgb(1.0, 2.0, 3.0);
        let b = RGBSpectrum::new(2.0);
        assert_eq!(a + b, RGBSpectrum::from_rgb(3.0, 4.0, 5.0));
        assert_eq!(a * b, RGBSpectrum::from_rgb(2.0, 4.0, 6.0));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!((a * 4.0) / 4.0, a);
        assert_eq!(a.max_component_value(), 3.0);
        let s: RGBSpectrum = vec![a, b].into_iter().sum();
        assert_eq!(s, a + b);
    }
}
