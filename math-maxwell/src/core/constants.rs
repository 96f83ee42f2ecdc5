//! Physical and numerical constants

use std::f64::consts::PI;

/// 4π
pub const PI4: f64 = 4.0 * PI;

/// 2π
pub const PI2: f64 = 2.0 * PI;

/// Vacuum permittivity ε₀ (F/m)
pub const VACUUM_PERMITTIVITY: f64 = 8.854187817e-12;

/// Vacuum permeability μ₀ (H/m)
pub const VACUUM_PERMEABILITY: f64 = 4.0 * PI * 1e-7;

/// Small epsilon for numerical comparisons
pub const EPSY: f64 = 1.0e-14;

/// Below this |kR| the regularized Green's function switches to its series
pub const GREEN_SERIES_THRESHOLD: f64 = 1.0e-4;

/// Below this |kR| the regularized gradient kernel switches to its series
pub const GRADIENT_SERIES_THRESHOLD: f64 = 1.0e-3;

/// Speed of light in vacuum derived from ε₀ and μ₀ (m/s)
pub fn speed_of_light() -> f64 {
    1.0 / (VACUUM_PERMITTIVITY * VACUUM_PERMEABILITY).sqrt()
}
