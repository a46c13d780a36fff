use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use nalgebra::{Point3, Quaternion, Unit, Vector3};

use qjulia::{
    camera::{CanvasInfo, PinholeCamera},
    float::Float,
    params::JuliaParamsBuilder,
    render::render,
    sampler::UniformSampler,
    solid::JuliaSet,
};

/// Parse `N` comma separated numbers, like `-0.8,0.2,0,0`.
fn parse_components<const N: usize>(s: &str) -> Result<[Float; N], String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<Float>().map_err(|err| format!("{part:?}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;

    values
        .try_into()
        .map_err(|values: Vec<Float>| format!("expected {N} values, got {}", values.len()))
}

/// Render a three dimensional slice of a quaternion Julia set.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to write the rendered PNG.
    #[arg(default_value = "qjulia.png")]
    output: PathBuf,

    /// Print an ascii preview instead of writing an image.
    #[arg(long)]
    ascii: bool,

    #[arg(long, default_value_t = 320, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    #[arg(long, default_value_t = 240, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Sub-pixel samples along each axis, so each pixel gets `samples * samples` rays.
    #[arg(long, default_value_t = 1)]
    samples: u32,

    /// Number of rendering threads.
    #[arg(short, long, default_value_t = num_cpus::get())]
    jobs: usize,

    /// The quaternion `c` that selects the Julia set, as `real,i,j,k`.
    #[arg(long, value_parser = parse_components::<4>, default_value = "-0.8,0.2,0,0", allow_hyphen_values = true)]
    c: [Float; 4],

    /// Radius of the sphere that bounds the set.
    #[arg(long)]
    radius: Option<Float>,

    /// Orbits that leave this radius are outside the set.
    #[arg(long)]
    escape_radius: Option<Float>,

    #[arg(long)]
    iterations: Option<u32>,

    /// How close a sample must get to the boundary to count as touching it.
    #[arg(long, default_value_t = 0.001)]
    epsilon: Float,

    /// Use epsilon as an absolute distance, rather than scaling it by distance from the camera.
    #[arg(long)]
    absolute_epsilon: bool,

    /// Finite difference step for normals.
    #[arg(long)]
    delta: Option<Float>,

    #[arg(long)]
    max_intersections: Option<usize>,

    /// Camera position, as `x,y,z`.
    #[arg(long, value_parser = parse_components::<3>, default_value = "3,0.1,-3", allow_hyphen_values = true)]
    eye: [Float; 3],

    /// Camera view direction, as `x,y,z`.
    #[arg(long, value_parser = parse_components::<3>, default_value = "-1,0,1", allow_hyphen_values = true)]
    look: [Float; 3],

    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 50.)]
    fov: Float,
}

impl Args {
    fn julia_set(&self) -> Result<JuliaSet> {
        let [real, i, j, k] = self.c;
        let mut builder = JuliaParamsBuilder::default()
            .set_c(Quaternion::new(real, i, j, k))
            .set_epsilon(self.epsilon)
            .set_epsilon_relative_to_distance(!self.absolute_epsilon);

        if let Some(radius) = self.radius {
            builder = builder.set_bounding_sphere_radius(radius);
        }
        if let Some(radius) = self.escape_radius {
            builder = builder.set_escape_radius(radius);
        }
        if let Some(iterations) = self.iterations {
            builder = builder.set_max_iterations(iterations);
        }
        if let Some(delta) = self.delta {
            builder = builder.set_delta(delta);
        }
        if let Some(intersections) = self.max_intersections {
            builder = builder.set_max_intersections(intersections);
        }

        let params = builder.build().context("Invalid julia set parameters")?;
        Ok(JuliaSet::new(params))
    }

    fn camera(&self, info: &CanvasInfo) -> Result<PinholeCamera> {
        let direction = Unit::try_new(Vector3::from(self.look), Float::EPSILON)
            .context("The look direction must not be zero")?;
        Ok(PinholeCamera::new(
            info,
            Point3::from(self.eye),
            direction,
            self.fov,
        ))
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();

    let set = args.julia_set()?;
    let info = CanvasInfo::new(args.width, args.height);
    let camera = args.camera(&info)?;

    info!(
        "rendering c = {:?} at {}x{} with {} threads",
        args.c, args.width, args.height, args.jobs
    );

    let start = Instant::now();
    let canvas = render(
        &info,
        &set,
        &camera,
        UniformSampler::new(args.samples),
        args.jobs,
    );
    info!("rendered in {:.2?}", start.elapsed());

    if args.ascii {
        print!("{}", canvas.to_ascii());
        return Ok(());
    }

    image::save_buffer(
        &args.output,
        &canvas.data(),
        canvas.width(),
        canvas.height(),
        image::ExtendedColorType::Rgb8,
    )
    .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
