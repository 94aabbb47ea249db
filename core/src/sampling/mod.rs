//! Sampling

mod common;
mod discrete;
mod sample_grid;

// Re-export
pub use common::*;
pub use discrete::*;
pub use sample_grid::*;
