//! Photon map settings.

use crate::photon::*;
use crate::policy::*;
use photon_core::paramset::*;
use photon_core::pbrt::*;

/// How photons offered to a store are admitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertionMode {
    /// Store everything.
    All,

    /// Accept or reject against a target density.
    Density,
}

/// Parameters of a `PhotonMap`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotonMapSettings {
    /// Maximum number of photons stored.
    pub max_photons: usize,

    /// Number of photons used by an estimate.
    pub lookup: usize,

    /// Initial search radius of an estimate.
    pub max_dist: Float,

    /// Number of photons used to estimate the local density during insertion.
    pub density_lookup: usize,

    /// Pending photons that trigger a rebuild while density control is active.
    pub max_pending: usize,

    /// RNG stream used for acceptance decisions.
    pub seed: u64,

    /// Insertion mode.
    pub insertion: InsertionMode,

    /// Constant target density in photons per unit area.
    pub target_density: Option<Float>,

    /// Handling of rejected photons.
    pub rejection: RejectionPolicy,

    /// Minimum cosine between the normals of a query and a cached record.
    pub normal_cosine: Float,

    /// Density shown at the top of the false colour ramp.
    pub density_scale: Float,

    /// Skip photons deposited directly by the light in estimates.
    pub exclude_direct: bool,
}

impl Default for PhotonMapSettings {
    fn default() -> Self {
        Self {
            max_photons: 100_000,
            lookup: 50,
            max_dist: INFINITY,
            density_lookup: 8,
            max_pending: 4096,
            seed: 0,
            insertion: InsertionMode::All,
            target_density: None,
            rejection: RejectionPolicy::default(),
            normal_cosine: 0.9,
            density_scale: 1000.0,
            exclude_direct: false,
        }
    }
}

impl PhotonMapSettings {
    /// Returns the squared initial search radius.
    pub fn max_dist_sq(&self) -> Float {
        self.max_dist * self.max_dist
    }

    /// Returns the flags of photons estimates skip.
    pub fn exclude_flags(&self) -> PhotonFlags {
        if self.exclude_direct {
            PhotonFlags::DIRECT
        } else {
            PhotonFlags::empty()
        }
    }

    /// Returns the insertion policy described by these settings. Density
    /// control without a constant target stores everything; importance driven
    /// control is set up by `importance_policy()`.
    pub fn insertion_policy(&self) -> Box<dyn InsertionPolicy> {
        match (self.insertion, self.target_density) {
            (InsertionMode::All, _) => Box::new(StoreAll),
            (InsertionMode::Density, Some(target)) => Box::new(DensityControl::new(
                Box::new(ConstantDensity(target)),
                self.rejection,
            )),
            (InsertionMode::Density, None) => {
                warn!("Density control without 'targetdensity'; storing all photons");
                Box::new(StoreAll)
            }
        }
    }
}

impl TryFrom<&ParamSet> for PhotonMapSettings {
    type Error = String;

    /// Reads settings from a parameter set.
    ///
    /// * `params` - Parameter set.
    fn try_from(params: &ParamSet) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let max_photons = params.find_one_int("maxphotons", defaults.max_photons as i64);
        if max_photons < 0 {
            return Err(format!("'maxphotons' must not be negative, got {}", max_photons));
        }

        let lookup = params.find_one_int("lookup", defaults.lookup as i64);
        if lookup < 1 {
            return Err(format!("'lookup' must be at least 1, got {}", lookup));
        }

        let max_dist = params.find_one_number("maxdist", defaults.max_dist);
        if !(max_dist > 0.0) {
            return Err(format!("'maxdist' must be positive, got {}", max_dist));
        }

        let density_lookup = params.find_one_int("densitylookup", defaults.density_lookup as i64);
        if density_lookup < 2 {
            return Err(format!("'densitylookup' must be at least 2, got {}", density_lookup));
        }

        let max_pending = params.find_one_int("maxpending", defaults.max_pending as i64);
        if max_pending < 1 {
            return Err(format!("'maxpending' must be at least 1, got {}", max_pending));
        }

        let seed = params.find_one_int("seed", defaults.seed as i64);

        let insertion = match params.find_one_string("insertion", String::from("all")).as_str() {
            "all" => InsertionMode::All,
            "density" => InsertionMode::Density,
            other => return Err(format!("Unknown insertion mode '{}'", other)),
        };

        let target_density = match params.find_one_number("targetdensity", -1.0) {
            t if t < 0.0 => None,
            t if t > 0.0 => Some(t),
            t => return Err(format!("'targetdensity' must be positive, got {}", t)),
        };

        let rejection = RejectionPolicy::try_from(
            params
                .find_one_string("rejection", defaults.rejection.to_string())
                .as_str(),
        )?;

        let normal_cosine = params.find_one_number("normalcosine", defaults.normal_cosine);
        if !(-1.0..=1.0).contains(&normal_cosine) {
            return Err(format!("'normalcosine' must be in [-1, 1], got {}", normal_cosine));
        }

        let density_scale = params.find_one_number("densityscale", defaults.density_scale);
        if !(density_scale > 0.0) {
            return Err(format!("'densityscale' must be positive, got {}", density_scale));
        }

        let exclude_direct = params.find_one_bool("excludedirect", defaults.exclude_direct);

        if insertion == InsertionMode::All && target_density.is_some() {
            warn!("'targetdensity' ignored without 'insertion=density'");
        }

        Ok(Self {
            max_photons: max_photons as usize,
            lookup: lookup as usize,
            max_dist,
            density_lookup: density_lookup as usize,
            max_pending: max_pending as usize,
            seed: seed as u64,
            insertion,
            target_density,
            rejection,
            normal_cosine,
            density_scale,
            exclude_direct,
        })
    }
}

/// Parameters of an `ImportanceMap`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportanceSettings {
    /// Photons wanted per pixel footprint.
    pub photons_per_pixel: Float,

    /// Width of a pixel in the image plane at unit distance.
    pub pixel_width: Float,

    /// Height of a pixel in the image plane at unit distance.
    pub pixel_height: Float,

    /// Smallest density ever required.
    pub min_density: Float,

    /// Cache reconstructed importance at every importon after balancing.
    pub precompute: bool,

    /// Fewest importons an estimate needs.
    pub min_importons: usize,
}

impl Default for ImportanceSettings {
    fn default() -> Self {
        Self {
            photons_per_pixel: 1.0,
            pixel_width: 1.0,
            pixel_height: 1.0,
            min_density: 0.0,
            precompute: true,
            min_importons: 3,
        }
    }
}

impl ImportanceSettings {
    /// Returns the area of one pixel.
    pub fn pixel_area(&self) -> Float {
        self.pixel_width * self.pixel_height
    }
}

impl TryFrom<&ParamSet> for ImportanceSettings {
    type Error = String;

    /// Reads settings from a parameter set.
    ///
    /// * `params` - Parameter set.
    fn try_from(params: &ParamSet) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let photons_per_pixel =
            params.find_one_number("photonsperpixel", defaults.photons_per_pixel);
        if !(photons_per_pixel > 0.0) {
            return Err(format!(
                "'photonsperpixel' must be positive, got {}",
                photons_per_pixel
            ));
        }

        let pixel_width = params.find_one_number("pixelwidth", defaults.pixel_width);
        let pixel_height = params.find_one_number("pixelheight", defaults.pixel_height);
        if !(pixel_width > 0.0 && pixel_height > 0.0) {
            return Err(format!(
                "Pixel size must be positive, got {} x {}",
                pixel_width, pixel_height
            ));
        }

        let min_density = params.find_one_number("mindensity", defaults.min_density);
        if min_density < 0.0 {
            return Err(format!("'mindensity' must not be negative, got {}", min_density));
        }

        let precompute = params.find_one_bool("precompute", defaults.precompute);

        let min_importons = params.find_one_int("minimportons", defaults.min_importons as i64);
        if min_importons < 1 {
            return Err(format!("'minimportons' must be at least 1, got {}", min_importons));
        }

        Ok(Self {
            photons_per_pixel,
            pixel_width,
            pixel_height,
            min_density,
            precompute,
            min_importons: min_importons as usize,
        })
    }
}
