//! Clamp

use super::Float;
use num_traits::Num;

/// Clamps a value x to [min, max].
///
/// * `x` - The number to clamp.
/// * `min` - Minimum value.
/// * `max` - Maximum value.
pub fn clamp<T>(x: T, min: T, max: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

/// Clamps a probability to [0, 1]. NaN maps to 0.
///
/// * `p` - The probability.
#[inline]
pub fn clamp_probability(p: Float) -> Float {
    if p.is_nan() {
        0.0
    } else {
        clamp(p, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_range() {
        assert_eq!(clamp(5, 0, 3), 3);
        assert_eq!(clamp(-1, 0, 3), 0);
        assert_eq!(clamp(2, 0, 3), 2);
    }

    #[test]
    fn probability() {
        assert_eq!(clamp_probability(1.5), 1.0);
        assert_eq!(clamp_probability(-0.5), 0.0);
        assert_eq!(clamp_probability(Float::NAN), 0.0);
        assert_eq!(clamp_probability(0.25), 0.25);
    }
}
