//! Discrete inverse-CDF sampling.

use crate::pbrt::*;
use crate::rng::ONE_MINUS_EPSILON;

/// Result of sampling a bucket from a set of weights.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiscreteSample {
    /// Index of the chosen bucket.
    pub index: usize,

    /// Probability mass of the chosen bucket, `weights[index] / total`.
    pub pdf: Float,

    /// The random sample remapped to [0, 1) inside the chosen bucket.
    pub remapped: Float,
}

/// Chooses a bucket with probability proportional to its weight by walking
/// the running sum of `weights` until it passes `u * total`.
///
/// Buckets with zero weight are never chosen. If `total` is not positive the
/// buckets are treated as equally likely.
///
/// * `weights` - Non-negative, unnormalized weights.
/// * `total`   - Sum of `weights`.
/// * `u`       - Uniform random sample in [0, 1).
pub fn sample_discrete(weights: &[Float], total: Float, u: Float) -> DiscreteSample {
    let n = weights.len();
    assert!(n > 0, "sample_discrete() needs at least one weight");

    if total <= 0.0 {
        let scaled = u * n as Float;
        let index = min(scaled as usize, n - 1);
        return DiscreteSample {
            index,
            pdf: 1.0 / n as Float,
            remapped: min(scaled - index as Float, ONE_MINUS_EPSILON),
        };
    }

    let target = u * total;
    let mut cdf = 0.0;
    for (index, &w) in weights.iter().enumerate() {
        debug_assert!(w >= 0.0, "negative weight {} at {}", w, index);
        let next = cdf + w;
        if target < next && w > 0.0 {
            return DiscreteSample {
                index,
                pdf: w / total,
                remapped: clamp((target - cdf) / w, 0.0, ONE_MINUS_EPSILON),
            };
        }
        cdf = next;
    }

    // Round-off pushed `target` past the accumulated sum; use the last
    // bucket that can be sampled.
    let index = weights.iter().rposition(|w| *w > 0.0).unwrap_or(n - 1);
    DiscreteSample {
        index,
        pdf: weights[index] / total,
        remapped: ONE_MINUS_EPSILON,
    }
}

/// Returns true with probability `p` using a two-bucket discrete sample.
///
/// * `p` - Probability of success; clamped to [0, 1].
/// * `u` - Uniform random sample in [0, 1).
pub fn bernoulli(p: Float, u: Float) -> bool {
    let p = clamp_probability(p);
    sample_discrete(&[p, 1.0 - p], 1.0, u).index == 0
}
