//! Random Number Generator.

use crate::geometry::Point2f;
use crate::pbrt::*;

/// 1 - epsilon in the precision we've selected for `Float`.
pub const ONE_MINUS_EPSILON: Float = hexf32!("0x1.fffffep-1"); // 0.99999994

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32 pseudo-random number generator.
///
/// Density control draws its acceptance tests from one of these; runs are
/// reproducible as long as the same stream is advanced in the same order.
#[derive(Clone, Debug)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    /// Return a new instance of `RNG` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` by seeding it with the given starting sequence.
    ///
    /// * `sequence_index` - The starting sequence to seed with.
    pub fn new(sequence_index: u64) -> Self {
        let mut ret = Self { state: 0, inc: 0 };
        ret.set_sequence(sequence_index);
        ret
    }

    fn set_sequence(&mut self, init_seq: u64) {
        self.state = 0;
        self.inc = init_seq.wrapping_shl(1) | 1;
        self.uniform_u32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_u32();
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value over the half open interval [0.0, 1.0).
    pub fn uniform_float(&mut self) -> Float {
        min(
            self.uniform_u32() as Float * hexf32!("0x1.0p-32"),
            ONE_MINUS_EPSILON,
        )
    }

    /// Returns a point uniformly distributed over [0, 1)^2.
    pub fn uniform_point2(&mut self) -> Point2f {
        let x = self.uniform_float();
        let y = self.uniform_float();
        Point2f::new(x, y)
    }
}
