//! Core numeric, geometric and sampling types shared by the photon map crates.

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

pub mod geometry;
pub mod paramset;
pub mod pbrt;
pub mod rng;
pub mod sampling;
pub mod spectrum;
