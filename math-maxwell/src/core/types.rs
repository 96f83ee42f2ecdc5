//! Core data types for the scattering solver
//!
//! Physical parameters, media and the solver configuration record.

use serde::{Deserialize, Serialize};

use crate::core::constants::{PI2, VACUUM_PERMEABILITY, VACUUM_PERMITTIVITY, speed_of_light};
use crate::core::error::AssemblyError;

// ============================================================================
// Physics
// ============================================================================

/// Physical parameters of one scattering problem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Frequency (Hz)
    pub frequency: f64,
    /// Angular frequency ω = 2πf
    pub omega: f64,
    /// Relative permittivity of the scatterer
    pub eps_r: f64,
    /// Relative permeability of the scatterer
    pub mu_r: f64,
    /// Exterior (vacuum) wavenumber k_ext = ω√(ε₀μ₀)
    pub k_ext: f64,
    /// Interior wavenumber k_int = k_ext√(ε_r μ_r)
    pub k_int: f64,
    /// Exterior wavelength
    pub wavelength: f64,
}

impl PhysicsParams {
    /// Create parameters from a frequency and the scatterer's material
    pub fn new(frequency: f64, eps_r: f64, mu_r: f64) -> Result<Self, AssemblyError> {
        check_positive("frequency", frequency)?;
        let omega = PI2 * frequency;
        let k_ext = omega * (VACUUM_PERMITTIVITY * VACUUM_PERMEABILITY).sqrt();
        Self::with_wavenumber(k_ext, eps_r, mu_r)
    }

    /// Create parameters directly from the exterior wavenumber
    ///
    /// Useful for dimensionless problems where the geometry is given in units
    /// of 1/k.
    pub fn with_wavenumber(k_ext: f64, eps_r: f64, mu_r: f64) -> Result<Self, AssemblyError> {
        if !(k_ext.is_finite() && k_ext > 0.0) {
            return Err(AssemblyError::InvalidWavenumber { wavenumber: k_ext });
        }
        check_positive("eps_r", eps_r)?;
        check_positive("mu_r", mu_r)?;

        let omega = k_ext * speed_of_light();
        Ok(Self {
            frequency: omega / PI2,
            omega,
            eps_r,
            mu_r,
            k_ext,
            k_int: k_ext * (eps_r * mu_r).sqrt(),
            wavelength: PI2 / k_ext,
        })
    }

    /// Refractive index √(ε_r μ_r)
    pub fn refractive_index(&self) -> f64 {
        (self.eps_r * self.mu_r).sqrt()
    }

    /// The unbounded vacuum surrounding the scatterer
    pub fn exterior_medium(&self) -> Medium {
        Medium {
            side: Side::Exterior,
            wavenumber: self.k_ext,
            eps_r: 1.0,
            mu_r: 1.0,
        }
    }

    /// The dielectric filling the scatterer
    pub fn interior_medium(&self) -> Medium {
        Medium {
            side: Side::Interior,
            wavenumber: self.k_int,
            eps_r: self.eps_r,
            mu_r: self.mu_r,
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), AssemblyError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AssemblyError::InvalidParameter { name, value })
    }
}

/// Which side of the interface a medium fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bounded region enclosed by the mesh
    Interior,
    /// Unbounded region outside the mesh
    Exterior,
}

/// A homogeneous medium on one side of the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    /// Side of the interface
    pub side: Side,
    /// Wavenumber in this medium
    pub wavenumber: f64,
    /// Relative permittivity
    pub eps_r: f64,
    /// Relative permeability
    pub mu_r: f64,
}

impl Medium {
    /// Relative wave impedance √(μ_r/ε_r)
    pub fn impedance_ratio(&self) -> f64 {
        (self.mu_r / self.eps_r).sqrt()
    }

    /// Tag attached to grid functions living in this medium
    pub fn tag(&self) -> MediumTag {
        MediumTag {
            side: self.side,
            wavenumber: self.wavenumber,
        }
    }

    /// Reject non-physical parameters before any assembly work
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if !(self.wavenumber.is_finite() && self.wavenumber > 0.0) {
            return Err(AssemblyError::InvalidWavenumber {
                wavenumber: self.wavenumber,
            });
        }
        check_positive("eps_r", self.eps_r)?;
        check_positive("mu_r", self.mu_r)
    }
}

/// Medium a grid function belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediumTag {
    /// Side of the interface
    pub side: Side,
    /// Wavenumber of the medium
    pub wavenumber: f64,
}

// ============================================================================
// Configuration
// ============================================================================

/// Discrete function space layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    /// RWG for domain and range, rotated RWG for the dual-to-range space
    #[default]
    AllRwg,
}

/// Boundary operator assembly backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblerKind {
    /// Dense O(N²) Galerkin assembly
    #[default]
    Dense,
    /// Hierarchical / fast multipole compression
    Accelerated,
}

/// Compute backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Single thread
    Sequential,
    /// Rayon thread pool (falls back to sequential without the `parallel` feature)
    #[default]
    Parallel,
}

/// Quadrature settings for operator assembly and potential evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    /// Points of the triangle rule for well-separated pairs (1, 4, 7 or 13)
    pub regular_points: usize,
    /// Points of the triangle rule for near and coincident pairs
    pub near_points: usize,
    /// Pairs closer than this multiple of the element diameter use singularity subtraction
    pub near_field_factor: f64,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            regular_points: 7,
            near_points: 7,
            near_field_factor: 2.0,
        }
    }
}

/// Point classification tolerances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// On-surface distance, relative to the mesh bounding-box diagonal
    pub surface_tolerance: f64,
    /// Allowed deviation of the winding number from an integer
    pub winding_tolerance: f64,
    /// Bounding-box inflation for the exterior fast path, relative to the diagonal
    pub bbox_margin: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            surface_tolerance: 1e-10,
            winding_tolerance: 1e-3,
            bbox_margin: 1e-6,
        }
    }
}

/// Solver configuration record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Function space layout
    pub space_type: SpaceType,
    /// Assembly backend
    pub assembler: AssemblerKind,
    /// Compute backend
    pub device: Device,
    /// Quadrature settings
    pub quadrature: QuadratureConfig,
    /// Classification tolerances
    pub classifier: ClassifierConfig,
    /// Systems whose reciprocal condition estimate falls below this are rejected
    pub rcond_threshold: f64,
    /// Run the self-intersection check during mesh validation
    pub check_self_intersection: bool,
    /// Log stage progress at info level
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            space_type: SpaceType::AllRwg,
            assembler: AssemblerKind::Dense,
            device: Device::Parallel,
            quadrature: QuadratureConfig::default(),
            classifier: ClassifierConfig::default(),
            rcond_threshold: 1e-13,
            check_self_intersection: true,
            verbose: false,
        }
    }
}
