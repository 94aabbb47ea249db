//! Photon maps: storage of light-transport samples in a balanced kd-tree and
//! kernel density reconstruction of radiance and importance from them.

#[macro_use]
extern crate log;

mod bsdf;
mod guiding;
mod importance_map;
mod irradiance;
mod kd_tree;
mod photon;
mod photon_map;
mod policy;
mod settings;
mod stats;

// Re-export
pub use bsdf::*;
pub use guiding::*;
pub use importance_map::*;
pub use kd_tree::*;
pub use photon::*;
pub use photon_map::*;
pub use policy::*;
pub use settings::*;
pub use stats::*;
