//! Incident field computation
//!
//! A time-harmonic electric plane wave `E(x) = p exp(i k d·x)` travelling in
//! the exterior medium. Besides the field itself the model provides the two
//! boundary traces that form the right-hand side of the multitrace system:
//!
//! - tangential trace `γ_t E = E × ν`
//! - Neumann trace `γ_N E = (1/ik) (curl E) × ν = (d × p) exp(i k d·x) × ν`
//!
//! The traces use the rotated convention `u × ν` (that is `−ν × u`), the
//! same one used by the multitrace operators and the representation formula.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::error::AssemblyError;
use crate::core::vector::{CVec3, Vec3, ccross_real, cscale, cross, dot, normalize};

/// Orthogonality tolerance between direction and polarization
const ORTHOGONALITY_TOL: f64 = 1e-10;

/// Electric plane wave in the exterior medium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidentPlaneWave {
    wavenumber: f64,
    direction: Vec3,
    polarization: Vec3,
}

impl IncidentPlaneWave {
    /// Create a plane wave; direction and polarization are normalized and
    /// must be orthogonal
    pub fn new(wavenumber: f64, direction: Vec3, polarization: Vec3) -> Result<Self, AssemblyError> {
        if !(wavenumber.is_finite() && wavenumber > 0.0) {
            return Err(AssemblyError::InvalidWavenumber { wavenumber });
        }
        let direction = normalize(&direction).ok_or(AssemblyError::InvalidParameter {
            name: "direction",
            value: 0.0,
        })?;
        let polarization = normalize(&polarization).ok_or(AssemblyError::InvalidParameter {
            name: "polarization",
            value: 0.0,
        })?;
        let overlap = dot(&direction, &polarization);
        if overlap.abs() > ORTHOGONALITY_TOL {
            return Err(AssemblyError::InvalidParameter {
                name: "polarization",
                value: overlap,
            });
        }
        Ok(Self {
            wavenumber,
            direction,
            polarization,
        })
    }

    /// Wave travelling in the x-y plane at angle `theta` from the x axis,
    /// polarized along z
    pub fn in_xy_plane(wavenumber: f64, theta: f64) -> Result<Self, AssemblyError> {
        if !theta.is_finite() {
            return Err(AssemblyError::InvalidParameter {
                name: "theta",
                value: theta,
            });
        }
        Self::new(wavenumber, [theta.cos(), theta.sin(), 0.0], [0.0, 0.0, 1.0])
    }

    /// Exterior wavenumber
    pub fn wavenumber(&self) -> f64 {
        self.wavenumber
    }

    /// Unit propagation direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Unit polarization
    pub fn polarization(&self) -> Vec3 {
        self.polarization
    }

    #[inline]
    fn phase(&self, x: &Vec3) -> Complex64 {
        Complex64::new(0.0, self.wavenumber * dot(&self.direction, x)).exp()
    }

    /// Electric field `p exp(i k d·x)`
    pub fn field(&self, x: &Vec3) -> CVec3 {
        cscale(self.phase(x), &self.polarization)
    }

    /// `(1/ik) curl E = (d × p) exp(i k d·x)`
    pub fn scaled_curl(&self, x: &Vec3) -> CVec3 {
        cscale(self.phase(x), &cross(&self.direction, &self.polarization))
    }

    /// Tangential trace `E × ν`
    pub fn tangential_trace(&self, x: &Vec3, normal: &Vec3) -> CVec3 {
        ccross_real(&self.field(x), normal)
    }

    /// Neumann trace `(1/ik)(curl E) × ν`
    pub fn neumann_trace(&self, x: &Vec3, normal: &Vec3) -> CVec3 {
        ccross_real(&self.scaled_curl(x), normal)
    }

    /// Evaluate the field at a set of points (N × 3), returning N × 3 values
    pub fn evaluate_field(&self, points: &Array2<f64>) -> Array2<Complex64> {
        let mut out = Array2::zeros((points.nrows(), 3));
        for (i, row) in points.rows().into_iter().enumerate() {
            let e = self.field(&[row[0], row[1], row[2]]);
            for c in 0..3 {
                out[[i, c]] = e[c];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    #[test]
    fn test_field_at_origin_is_polarization() {
        let wave = IncidentPlaneWave::in_xy_plane(2.0, 0.3).unwrap();
        let e = wave.field(&[0.0, 0.0, 0.0]);
        assert_relative_eq!(e[2].re, 1.0);
        assert_relative_eq!(e[0].norm(), 0.0);
    }

    #[test]
    fn test_phase_advances_along_direction() {
        let k = 2.0 * PI;
        let wave = IncidentPlaneWave::in_xy_plane(k, 0.0).unwrap();
        // Quarter wavelength along x
        let e = wave.field(&[0.25, 0.0, 0.0]);
        assert_relative_eq!(e[2].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(e[2].im, 1.0, epsilon = 1e-12);
        // Motion orthogonal to the direction does not change the phase
        let e = wave.field(&[0.0, 0.7, -3.0]);
        assert_relative_eq!(e[2].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_direction_from_angle() {
        let wave = IncidentPlaneWave::in_xy_plane(1.0, PI / 2.0).unwrap();
        let d = wave.direction();
        assert_relative_eq!(d[0], 0.0, epsilon = 1e-15);
        assert_relative_eq!(d[1], 1.0);
        assert_eq!(wave.polarization(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_traces_are_tangential() {
        let wave = IncidentPlaneWave::in_xy_plane(1.3, 0.4).unwrap();
        let n = normalize(&[1.0, 2.0, 2.0]).unwrap();
        let x = [0.1, -0.2, 0.5];
        for trace in [wave.tangential_trace(&x, &n), wave.neumann_trace(&x, &n)] {
            let normal_part = trace[0] * n[0] + trace[1] * n[1] + trace[2] * n[2];
            assert_relative_eq!(normal_part.norm(), 0.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_neumann_trace_of_x_travelling_wave() {
        // d = x, p = z: d × p = -y, and (-y) × x = z
        let wave = IncidentPlaneWave::in_xy_plane(1.0, 0.0).unwrap();
        let t = wave.neumann_trace(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert_relative_eq!(t[2].re, 1.0, epsilon = 1e-15);
        // z × x = y
        let t = wave.tangential_trace(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]);
        assert_relative_eq!(t[1].re, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_rejects_non_orthogonal_polarization() {
        let err = IncidentPlaneWave::new(1.0, [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::InvalidParameter {
                name: "polarization",
                ..
            }
        ));
        assert!(IncidentPlaneWave::in_xy_plane(1.0, f64::NAN).is_err());
        assert!(IncidentPlaneWave::in_xy_plane(-1.0, 0.0).is_err());
    }

    #[test]
    fn test_evaluate_field_rows() {
        let wave = IncidentPlaneWave::in_xy_plane(1.0, 0.0).unwrap();
        let points = array![[0.0, 0.0, 0.0], [PI, 0.0, 0.0]];
        let values = wave.evaluate_field(&points);
        assert_eq!(values.dim(), (2, 3));
        assert_relative_eq!(values[[1, 2]].re, -1.0, epsilon = 1e-12);
    }
}
