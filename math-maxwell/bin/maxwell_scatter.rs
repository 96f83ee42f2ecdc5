//! Plane-wave scattering by a dielectric body
//!
//! Solves the multitrace system for a closed surface (STL file or generated
//! icosphere) and writes total and scattered intensity maps on a grid in the
//! plane z = 0 as JSON.
//!
//! Usage:
//!   cargo run --release --bin maxwell_scatter -- --config run.toml
//!   cargo run --release --bin maxwell_scatter -- --radius 1 --subdivisions 2 \
//!       --frequency 15e6 --eps-r 2.1 --nx 40 --ny 40
//!   cargo run --release --bin maxwell_scatter -- --help

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use directories::ProjectDirs;
use math_audio_maxwell::core::io::{MeshSource, ScatteringConfig, load_config, write_intensity_json};
use math_audio_maxwell::core::{Device, ObservationGrid, SolverConfig};

#[derive(Parser, Debug)]
#[command(name = "maxwell_scatter")]
#[command(about = "Plane-wave scattering by a homogeneous dielectric body (BEM)", long_about = None)]
struct Args {
    /// JSON or TOML run configuration; other flags are ignored when given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// STL mesh of the scatterer
    #[arg(long, conflicts_with = "radius")]
    stl: Option<PathBuf>,

    /// Radius of a generated icosphere scatterer
    #[arg(long, default_value_t = 1.0)]
    radius: f64,

    /// Subdivision level of the generated icosphere
    #[arg(long, default_value_t = 2)]
    subdivisions: usize,

    /// Frequency in Hz
    #[arg(short, long, default_value_t = 15e6)]
    frequency: f64,

    /// Relative permittivity of the scatterer
    #[arg(long, default_value_t = 2.1)]
    eps_r: f64,

    /// Relative permeability of the scatterer
    #[arg(long, default_value_t = 1.0)]
    mu_r: f64,

    /// Incidence angle in the x-y plane (radians)
    #[arg(long, default_value_t = 0.0)]
    theta: f64,

    /// Grid points along x
    #[arg(long, default_value_t = 40)]
    nx: usize,

    /// Grid points along y
    #[arg(long, default_value_t = 40)]
    ny: usize,

    /// Grid extent along x
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [-3.0, 3.0], allow_hyphen_values = true)]
    x_range: Vec<f64>,

    /// Grid extent along y
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [-3.0, 3.0], allow_hyphen_values = true)]
    y_range: Vec<f64>,

    /// Compute backend
    #[arg(long, value_enum, default_value_t = Backend::Parallel)]
    device: Backend,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Output JSON file (default: the user data directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Single thread
    Sequential,
    /// Rayon thread pool
    Parallel,
}

impl From<Backend> for Device {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sequential => Device::Sequential,
            Backend::Parallel => Device::Parallel,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    #[cfg(feature = "parallel")]
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to set thread pool")?;
        println!("Using {} threads", threads);
    }

    let (config, base_dir) = match &args.config {
        Some(path) => {
            println!("Loading configuration from: {}", path.display());
            let config = load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (config, base_dir)
        }
        None => (config_from_args(&args)?, PathBuf::from(".")),
    };

    print_config_summary(&config);

    let maps = config.run(&base_dir).context("scattering solve failed")?;

    let output = match args.output.clone().or_else(|| config.output.clone()) {
        Some(path) => path,
        None => default_output_dir()?.join("intensity.json"),
    };
    write_intensity_json(&output, &maps)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let finite_max = |values: &[f64]| {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max)
    };
    println!("\n=== Results ===");
    println!("Grid points:          {}", maps.total.len());
    println!("Max total intensity:  {:.6e}", finite_max(&maps.total));
    println!("Max scattered:        {:.6e}", finite_max(&maps.scattered));
    if !maps.report.is_clean() {
        println!("Reported points:      {}", maps.report.len());
    }
    println!("Saved to: {}", output.display());
    Ok(())
}

fn config_from_args(args: &Args) -> anyhow::Result<ScatteringConfig> {
    let mesh = match &args.stl {
        Some(path) => MeshSource::Stl { path: path.clone() },
        None => MeshSource::Icosphere {
            radius: args.radius,
            subdivisions: args.subdivisions,
        },
    };
    let grid = ObservationGrid::new(
        args.nx,
        args.ny,
        [args.x_range[0], args.x_range[1]],
        [args.y_range[0], args.y_range[1]],
    )?;
    let solver = SolverConfig {
        device: args.device.into(),
        verbose: args.verbose,
        ..SolverConfig::default()
    };
    Ok(ScatteringConfig {
        description: String::new(),
        mesh,
        physics: math_audio_maxwell::core::io::PhysicsConfig {
            frequency: args.frequency,
            eps_r: args.eps_r,
            mu_r: args.mu_r,
            theta: args.theta,
        },
        grid,
        solver,
        output: args.output.clone(),
    })
}

fn print_config_summary(config: &ScatteringConfig) {
    println!("=== Configuration ===");
    if !config.description.is_empty() {
        println!("Description: {}", config.description);
    }
    match &config.mesh {
        MeshSource::Stl { path } => println!("Mesh:        {}", path.display()),
        MeshSource::Icosphere {
            radius,
            subdivisions,
        } => println!("Mesh:        icosphere r = {radius}, {subdivisions} subdivisions"),
    }
    println!(
        "Physics:     f = {:.4e} Hz, eps_r = {}, mu_r = {}, theta = {}",
        config.physics.frequency, config.physics.eps_r, config.physics.mu_r, config.physics.theta
    );
    println!(
        "Grid:        {} x {} on [{}, {}] x [{}, {}], z = {}",
        config.grid.nx,
        config.grid.ny,
        config.grid.x_range[0],
        config.grid.x_range[1],
        config.grid.y_range[0],
        config.grid.y_range[1],
        config.grid.z
    );
}

fn default_output_dir() -> anyhow::Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "spinorama", "math-audio")
        .context("failed to determine project directories")?;
    let dir = proj_dirs.data_dir().join("maxwell");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
