//! Axis

/// Axis enumeration
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    #[default]
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// Returns the discriminator axis used at a given tree depth. Axes cycle
    /// X, Y, Z, X, ...
    ///
    /// * `depth` - Depth of the node; the root has depth 0.
    pub fn for_depth(depth: usize) -> Self {
        Axis::from(depth % 3)
    }
}

impl From<usize> for Axis {
    fn from(i: usize) -> Self {
        match i {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("invalid axis value"),
        }
    }
}

impl From<Axis> for usize {
    fn from(axis: Axis) -> usize {
        axis as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn depth_cycles_axes() {
        assert_eq!(Axis::for_depth(0), Axis::X);
        assert_eq!(Axis::for_depth(1), Axis::Y);
        assert_eq!(Axis::for_depth(2), Axis::Z);
        assert_eq!(Axis::for_depth(3), Axis::X);
    }

    proptest! {
        #[test]
        fn depth_axis_has_period_three(d in 0usize..10_000) {
            prop_assert_eq!(Axis::for_depth(d), Axis::for_depth(d + 3));
            prop_assert_eq!(usize::from(Axis::for_depth(d)), d % 3);
        }
    }
}
