#[macro_use]
extern crate log;

mod options;

use indicatif::{ProgressBar, ProgressStyle};
use options::*;
use photon_core::geometry::*;
use photon_core::paramset::*;
use photon_core::pbrt::*;
use photon_core::rng::RNG;
use photon_core::sampling::*;
use photon_core::spectrum::*;
use photon_map::*;
use std::sync::Arc;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    // In case of error report it.
    if let Err(e) = run(&options()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(opts: &Options) -> Result<(), String> {
    let mut params = ParamSet::new();
    for assignment in opts.params.iter() {
        params.add_assignment(assignment)?;
    }
    let map_settings = PhotonMapSettings::try_from(&params)?;
    let importance_settings = ImportanceSettings::try_from(&params)?;
    params.report_unused();

    let scene = Scene::new(opts);
    let lookup = shared_lookup(map_settings.lookup);

    let mut map = if opts.importance {
        if overrides_density_settings(&map_settings) {
            warn!("'--importance' replaces 'insertion=density' and 'targetdensity'");
        }
        let importance = Arc::new(trace_importons(
            &scene,
            opts,
            &map_settings,
            importance_settings,
            Arc::clone(&lookup),
        )?);
        info!("{}", importance.stats());
        let policy = importance_policy(&importance, map_settings.rejection);
        PhotonMap::with_policy(&map_settings, Arc::clone(&lookup), policy)
    } else {
        PhotonMap::new(&map_settings, Arc::clone(&lookup))
    };

    trace_photons(&scene, opts, &mut map)?;
    map.check_and_balance();
    info!("Traced {} light paths", map.paths());

    report(&scene, opts, &mut map);
    Ok(())
}

/// Returns true when density settings were given that importance-driven
/// control will replace.
fn overrides_density_settings(settings: &PhotonMapSettings) -> bool {
    settings.insertion == InsertionMode::Density || settings.target_density.is_some()
}

/// A point light above a square Lambertian floor at z = 0.
struct Scene {
    /// Light position.
    light: Point3f,

    /// Emitted power.
    power: Spectrum,

    /// Floor reflectance.
    floor: Lambertian,

    /// Half the floor side length.
    half_size: Float,

    /// Eye position of the importance pass.
    eye: Point3f,

    /// Cosine of the half angle of the eye's view cone.
    eye_cos: Float,
}

impl Scene {
    fn new(opts: &Options) -> Self {
        Self {
            light: Point3f::new(0.0, 0.0, opts.height),
            power: Spectrum::new(opts.power),
            floor: Lambertian::new(Spectrum::new(opts.albedo)),
            half_size: opts.floor_size * 0.5,
            eye: Point3f::new(opts.eye[0], opts.eye[1], opts.eye[2]),
            eye_cos: opts.fov.to_radians().cos(),
        }
    }

    fn floor_normal(&self) -> Normal3f {
        Normal3f::new(0.0, 0.0, 1.0)
    }

    /// Returns where a ray hits the floor.
    fn hit_floor(&self, o: &Point3f, dir: &Vector3f) -> Option<Point3f> {
        if dir.z >= 0.0 || o.z <= 0.0 {
            return None;
        }
        let p = *o + *dir * (o.z / -dir.z);
        if abs(p.x) <= self.half_size && abs(p.y) <= self.half_size {
            Some(Point3f::new(p.x, p.y, 0.0))
        } else {
            None
        }
    }

    /// Returns the radiance reflected by the floor at `p`.
    fn analytic_radiance(&self, p: &Point3f) -> Spectrum {
        let d = self.light.distance(p);
        let irradiance = self.power * (self.light.z / (4.0 * PI * d * d * d));
        irradiance * self.floor.r * INV_PI
    }
}

fn progress_bar(len: u64, quiet: bool) -> Result<ProgressBar, String> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .map_err(|e| format!("{e}"))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn trace_importons(
    scene: &Scene,
    opts: &Options,
    map_settings: &PhotonMapSettings,
    settings: ImportanceSettings,
    lookup: SharedLookup,
) -> Result<ImportanceMap, String> {
    let importance_map_settings = PhotonMapSettings {
        max_photons: opts.importons,
        insertion: InsertionMode::All,
        ..map_settings.clone()
    };
    let mut importance = ImportanceMap::new(&importance_map_settings, settings, lookup);

    let mut rng = RNG::new(opts.seed);
    let pb = progress_bar(opts.importons as u64, opts.quiet)?;
    for _ in 0..opts.importons {
        // Uniform direction in the view cone around -z.
        let u = rng.uniform_point2();
        let cos_theta = 1.0 - u.x * (1.0 - scene.eye_cos);
        let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
        let phi = u.y * TWO_PI;
        let dir = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), -cos_theta);

        if let Some(p) = scene.hit_floor(&scene.eye, &dir) {
            let importon = Importon::new(p, dir, scene.floor_normal(), 1.0, PhotonFlags::DIRECT);
            importance.add_importon(importon);
        }
        importance.add_path();
        pb.inc(1);
    }
    pb.finish_and_clear();

    importance.check_and_balance();
    Ok(importance)
}

fn trace_photons(scene: &Scene, opts: &Options, map: &mut PhotonMap<Photon>) -> Result<(), String> {
    let mut rng = RNG::new(opts.seed.wrapping_add(1));
    let n = scene.floor_normal();

    let pb = progress_bar(opts.photons as u64, opts.quiet)?;
    for _ in 0..opts.photons {
        let dir = uniform_sample_sphere(&rng.uniform_point2());
        if let Some(p) = scene.hit_floor(&scene.light, &dir) {
            map.add_photon(Photon::new(p, scene.power, dir, PhotonFlags::DIRECT), &n);
        }
        map.add_path();
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

fn report(scene: &Scene, opts: &Options, map: &mut PhotonMap<Photon>) {
    let mut ctx = NearestPhotons::default();
    let wo = Vector3f::new(0.0, 0.0, 1.0);
    let n = scene.floor_normal();

    println!("{:>8} {:>8} {:>12} {:>12} {:>8}", "x", "y", "estimate", "analytic", "ratio");
    for (x, y) in opts.query_points() {
        let hit = SurfaceHit::new(Point3f::new(x, y, 0.0), n);
        let estimate = map.reconstruct(&mut ctx, &hit, &wo, &scene.floor, None, None);
        let analytic = scene.analytic_radiance(&hit.p);
        let ratio = if analytic.y() > 0.0 { estimate.y() / analytic.y() } else { 0.0 };
        println!(
            "{:>8.3} {:>8.3} {:>12.6} {:>12.6} {:>8.3}",
            x,
            y,
            estimate.y(),
            analytic.y(),
            ratio
        );
        if opts.density {
            let c = map.density_color(&mut ctx, &hit);
            println!("{:>8} density {:.1} colour {}", "", map.density(&mut ctx, &hit.p), c);
        }
    }
    println!("{}", map.stats());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn settings(args: &[&str]) -> PhotonMapSettings {
        let mut params = ParamSet::new();
        for a in args {
            params.add_assignment(a).unwrap();
        }
        PhotonMapSettings::try_from(&params).unwrap()
    }

    #[test]
    fn density_settings_conflict_with_importance() {
        assert!(!overrides_density_settings(&settings(&[])));
        assert!(overrides_density_settings(&settings(&["insertion=density"])));
        assert!(overrides_density_settings(&settings(&["targetdensity=10"])));
    }

    #[test]
    fn photons_carry_full_light_power() {
        let opts = Options::parse_from(["photon-demo", "--quiet", "-n", "20000", "--seed", "18446744073709551615"]);
        let scene = Scene::new(&opts);
        let mut map = PhotonMap::new(&PhotonMapSettings::default(), shared_lookup(200));
        trace_photons(&scene, &opts, &mut map).unwrap();
        map.check_and_balance();
        assert!(map.len() > 0);
        assert!(map.iter().all(|p| p.power == scene.power));

        let mut ctx = NearestPhotons::default();
        let hit = SurfaceHit::new(Point3f::new(0.0, 0.0, 0.0), scene.floor_normal());
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let estimate = map.reconstruct(&mut ctx, &hit, &wo, &scene.floor, None, None).y();
        let analytic = scene.analytic_radiance(&hit.p).y();
        assert!((estimate / analytic - 1.0).abs() < 0.25, "estimate {} analytic {}", estimate, analytic);
    }
}
