//! Command line options.

use clap::Parser;
use photon_core::pbrt::Float;

/// Photon map demo: a point light above a Lambertian floor.
#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Options {
    /// Number of light paths.
    #[clap(
        long = "photons",
        short = 'n',
        value_name = "NUM",
        default_value_t = 100_000,
        help = "Number of light paths to trace."
    )]
    pub photons: usize,

    /// Height of the light above the floor.
    #[clap(long, value_name = "FLOAT", default_value_t = 1.0, help = "Height of the light above the floor.")]
    pub height: Float,

    /// Emitted power.
    #[clap(long, value_name = "FLOAT", default_value_t = 100.0, help = "Power emitted by the light.")]
    pub power: Float,

    /// Floor reflectance.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.5, help = "Reflectance of the floor.")]
    pub albedo: Float,

    /// Floor side length.
    #[clap(
        long = "floorsize",
        value_name = "FLOAT",
        default_value_t = 4.0,
        help = "Side length of the square floor."
    )]
    pub floor_size: Float,

    /// Run an importance pass that steers photon density.
    #[clap(long, help = "Trace importons first and use them to control photon density.")]
    pub importance: bool,

    /// Number of eye paths of the importance pass.
    #[clap(
        long,
        value_name = "NUM",
        default_value_t = 20_000,
        help = "Number of eye paths traced by the importance pass."
    )]
    pub importons: usize,

    /// Eye position of the importance pass.
    #[clap(
        long,
        value_name = "FLOAT",
        num_args = 3,
        allow_negative_numbers = true,
        default_values_t = vec![0.0, 0.0, 2.0],
        help = "Eye position of the importance pass (x y z)."
    )]
    pub eye: Vec<Float>,

    /// Half angle of the eye's view cone in degrees.
    #[clap(
        long,
        value_name = "DEGREES",
        default_value_t = 20.0,
        help = "Half angle of the eye's view cone in degrees."
    )]
    pub fov: Float,

    /// RNG seed.
    #[clap(long, value_name = "NUM", default_value_t = 0, help = "Seed of the random streams.")]
    pub seed: u64,

    /// Photon map parameters.
    #[clap(
        long = "param",
        short = 'p',
        value_name = "NAME=VALUE",
        help = "Photon map parameter, e.g. lookup=500 or insertion=density."
    )]
    pub params: Vec<String>,

    /// Query points.
    #[clap(
        long = "at",
        value_name = "FLOAT",
        num_args = 2,
        allow_negative_numbers = true,
        help = "Floor point to estimate radiance at (x y). Repeatable."
    )]
    pub at: Vec<Float>,

    /// Print density false colours.
    #[clap(long, help = "Also print photon density and its false colour.")]
    pub density: bool,

    /// Suppress progress bars.
    #[clap(long, help = "Suppress progress bars.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the query points; the centre and four points around it unless
    /// given on the command line.
    pub fn query_points(&self) -> Vec<(Float, Float)> {
        if self.at.len() < 2 {
            vec![(0.0, 0.0), (0.5, 0.0), (-0.5, 0.0), (0.0, 0.5), (0.0, -0.5)]
        } else {
            self.at.chunks_exact(2).map(|c| (c[0], c[1])).collect()
        }
    }
}

/// Returns the parsed command line.
pub fn options() -> Options {
    Options::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::parse_from(["photon-demo"]);
        assert_eq!(opts.photons, 100_000);
        assert_eq!(opts.eye, vec![0.0, 0.0, 2.0]);
        assert_eq!(opts.query_points().len(), 5);
    }

    #[test]
    fn query_points_and_params() {
        let opts = Options::parse_from([
            "photon-demo",
            "--at",
            "0.25",
            "-0.5",
            "-p",
            "lookup=200",
            "-p",
            "insertion=density",
        ]);
        assert_eq!(opts.query_points(), vec![(0.25, -0.5)]);
        assert_eq!(opts.params, vec!["lookup=200", "insertion=density"]);
    }
}
