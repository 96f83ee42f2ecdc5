//! JSON/TOML description of a complete scattering run
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! description = "Dielectric sphere, quasi-static"
//!
//! [mesh]
//! type = "icosphere"
//! radius = 1.0
//! subdivisions = 2
//!
//! [physics]
//! frequency = 15e6
//! eps_r = 2.1
//! theta = 0.0
//!
//! [grid]
//! nx = 40
//! ny = 40
//! x_range = [-3.0, 3.0]
//! y_range = [-3.0, 3.0]
//!
//! [solver]
//! device = "parallel"
//! ```
//!
//! A mesh read from STL uses `type = "stl"` and `path = "sphere.stl"`;
//! relative paths are resolved against the configuration file's directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::MaxwellError;
use crate::core::io::stl::read_stl;
use crate::core::maxwell_solver::{IntensityMaps, MaxwellSolver, ScatteringProblem};
use crate::core::mesh::{TriangleMesh, icosphere};
use crate::core::postprocess::ObservationGrid;
use crate::core::types::{PhysicsParams, SolverConfig};

/// One scattering run: geometry, excitation, observation grid and solver options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteringConfig {
    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Scatterer surface
    pub mesh: MeshSource,

    /// Material and excitation
    pub physics: PhysicsConfig,

    /// Observation grid in a plane of constant z
    pub grid: ObservationGrid,

    /// Solver options
    #[serde(default)]
    pub solver: SolverConfig,

    /// Where to write the intensity maps
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Where the scatterer surface comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshSource {
    /// ASCII or binary STL file
    Stl {
        /// Path to the file
        path: PathBuf,
    },
    /// Generated icosphere centred at the origin
    Icosphere {
        /// Sphere radius
        radius: f64,
        /// Subdivision level; 20·4ⁿ triangles
        subdivisions: usize,
    },
}

impl MeshSource {
    /// Load or generate the mesh; relative STL paths are taken from `base_dir`
    pub fn load(&self, base_dir: &Path) -> Result<TriangleMesh, MaxwellError> {
        match self {
            MeshSource::Stl { path } => {
                let path = if path.is_relative() {
                    base_dir.join(path)
                } else {
                    path.clone()
                };
                read_stl(path)
            }
            MeshSource::Icosphere {
                radius,
                subdivisions,
            } => Ok(icosphere(*radius, *subdivisions)?),
        }
    }
}

/// Material and incident wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Frequency in Hz
    pub frequency: f64,

    /// Relative permittivity of the scatterer
    pub eps_r: f64,

    /// Relative permeability of the scatterer
    #[serde(default = "default_mu_r")]
    pub mu_r: f64,

    /// Incidence angle in the x-y plane (radians)
    #[serde(default)]
    pub theta: f64,
}

fn default_mu_r() -> f64 {
    1.0
}

impl PhysicsConfig {
    /// Derived physical parameters
    pub fn to_physics_params(&self) -> Result<PhysicsParams, MaxwellError> {
        Ok(PhysicsParams::new(self.frequency, self.eps_r, self.mu_r)?)
    }
}

impl ScatteringConfig {
    /// Build the problem, solve it and sample the grid
    pub fn run(&self, base_dir: &Path) -> Result<IntensityMaps, MaxwellError> {
        self.grid.validate()?;
        let mesh = Arc::new(self.mesh.load(base_dir)?);
        let physics = self.physics.to_physics_params()?;
        let problem = ScatteringProblem::plane_wave(mesh, physics, self.physics.theta)?;
        MaxwellSolver::new()
            .with_config(self.solver)
            .solve(&problem)?
            .intensity_maps(&self.grid)
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Load a configuration file; the format follows the extension (.json or .toml)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ScatteringConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
    let content = fs::read_to_string(path)?;
    parse_config(&content, format)
}

/// Parse a configuration from a string
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<ScatteringConfig, ConfigError> {
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
    }
}

/// Save a configuration file in the format of its extension
pub fn save_config<P: AsRef<Path>>(config: &ScatteringConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;
    fs::write(path, serialize_config(config, format)?)?;
    Ok(())
}

/// Serialize a configuration to a string
pub fn serialize_config(
    config: &ScatteringConfig,
    format: ConfigFormat,
) -> Result<String, ConfigError> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::SerializeError(e.to_string())),
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialize error
    #[error("Serialize error: {0}")]
    SerializeError(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Device;

    const SAMPLE_JSON: &str = r#"{
        "description": "Quasi-static sphere",
        "mesh": { "type": "icosphere", "radius": 1.0, "subdivisions": 0 },
        "physics": { "frequency": 15e6, "eps_r": 2.1 },
        "grid": { "nx": 3, "ny": 2, "x_range": [2.0, 4.0], "y_range": [-1.0, 1.0] },
        "solver": { "device": "sequential" }
    }"#;

    const SAMPLE_TOML: &str = r#"
description = "STL input"
output = "maps.json"

[mesh]
type = "stl"
path = "sphere.stl"

[physics]
frequency = 1e8
eps_r = 4.0
mu_r = 1.5
theta = 0.5

[grid]
nx = 10
ny = 5
x_range = [-2.0, 2.0]
y_range = [-1.0, 1.0]
z = 0.25
"#;

    #[test]
    fn test_parse_json() {
        let config = parse_config(SAMPLE_JSON, ConfigFormat::Json).unwrap();
        assert_eq!(config.description, "Quasi-static sphere");
        assert_eq!(
            config.mesh,
            MeshSource::Icosphere {
                radius: 1.0,
                subdivisions: 0
            }
        );
        assert_eq!(config.physics.mu_r, 1.0);
        assert_eq!(config.physics.theta, 0.0);
        assert_eq!(config.grid.z, 0.0);
        assert_eq!(config.solver.device, Device::Sequential);
        assert!(config.output.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_config(SAMPLE_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(
            config.mesh,
            MeshSource::Stl {
                path: PathBuf::from("sphere.stl")
            }
        );
        assert_eq!(config.physics.mu_r, 1.5);
        assert_eq!(config.grid.num_points(), 50);
        assert_eq!(config.grid.z, 0.25);
        assert_eq!(config.output, Some(PathBuf::from("maps.json")));
        assert_eq!(config.solver, SolverConfig::default());
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = parse_config(SAMPLE_JSON, ConfigFormat::Json).unwrap();
        for format in [ConfigFormat::Json, ConfigFormat::Toml] {
            let text = serialize_config(&config, format).unwrap();
            assert_eq!(parse_config(&text, format).unwrap(), config);
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("run.JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path("a/b/run.toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path("run.yaml"), None);
        assert!(matches!(
            load_config("run.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_physics_validation() {
        let physics = PhysicsConfig {
            frequency: -1.0,
            eps_r: 2.0,
            mu_r: 1.0,
            theta: 0.0,
        };
        assert!(matches!(
            physics.to_physics_params(),
            Err(MaxwellError::Assembly(_))
        ));
    }

    #[test]
    fn test_run_small_config() {
        let config = parse_config(SAMPLE_JSON, ConfigFormat::Json).unwrap();
        let maps = config.run(Path::new(".")).unwrap();
        assert_eq!(maps.total.len(), 6);
        assert!(maps.report.is_clean());
    }
}
