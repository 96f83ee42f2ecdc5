//! Input/Output for the scattering solver
//!
//! - [`stl`] - ASCII and binary STL meshes
//! - [`config`] - JSON/TOML run configuration
//! - [`output`] - JSON intensity maps

pub mod config;
pub mod output;
pub mod stl;

pub use config::{
    ConfigError, ConfigFormat, MeshSource, PhysicsConfig, ScatteringConfig, load_config,
    parse_config, save_config, serialize_config,
};
pub use output::{read_intensity_json, write_intensity_json};
pub use stl::{parse_stl, read_stl, write_stl};
