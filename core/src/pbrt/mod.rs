//! Numeric basics shared by the photon map crates.

mod axis;
mod clamp;
mod common;

// Re-export
pub use axis::*;
pub use clamp::*;
pub use common::*;
