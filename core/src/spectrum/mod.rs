//! Spectrum

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// The colour type carried by photons and returned by estimates.
pub type Spectrum = RGBSpectrum;
