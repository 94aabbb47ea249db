//! Geometry

mod common;
mod normal;
mod point2;
mod point3;
mod vector3;

// Re-export
pub use common::*;
pub use normal::*;
pub use point2::*;
pub use point3::*;
pub use vector3::*;
