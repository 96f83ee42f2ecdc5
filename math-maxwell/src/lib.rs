//! # Maxwell BEM: dielectric scattering with boundary elements
//!
//! Solves time-harmonic plane-wave scattering by a homogeneous dielectric
//! body with the multitrace (PMCHWT) boundary integral formulation.
//!
//! ## Features
//!
//! - RWG elements on closed triangle meshes, with mesh validation
//! - Dense Galerkin assembly with singularity subtraction
//! - LU solve guarded by a condition estimate
//! - Scattered, interior and total fields with per-point diagnostics
//! - Parallel execution with Rayon, bit-identical to sequential runs
//! - STL input, JSON/TOML configuration and JSON output
//!

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)] // Scientific code often has many parameters

pub mod core;
pub mod testing;

pub use core::{
    IntensityMaps, MaxwellError, MaxwellSolver, ScatteringProblem, ScatteringSolution, solve,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");
