//! Testing and validation infrastructure
//!
//! Quasi-static (Rayleigh) reference for a small dielectric sphere, error
//! metrics against it, and JSON export of validation runs.

use std::path::{Path, PathBuf};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::core::incident::IncidentPlaneWave;
use crate::core::vector::{CVec3, Vec3, cdot_real, norm, scale};

/// Small dielectric sphere (`k a ≪ 1`, `μ_r = 1`) centred at the origin
///
/// Inside, the field is the incident field scaled by `3/(ε_r+2)`. Outside,
/// the scattered field is that of a point dipole `p = a³ (ε_r−1)/(ε_r+2) E₀`:
///
/// ```text
/// E_s = e^{ikr} [ k² (n×p)×n / r + (3n(n·p) − p)(1/r³ − ik/r²) ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayleighSphere {
    /// Exterior wavenumber
    pub wavenumber: f64,
    /// Sphere radius
    pub radius: f64,
    /// Relative permittivity
    pub eps_r: f64,
}

impl RayleighSphere {
    /// Reference sphere
    pub fn new(wavenumber: f64, radius: f64, eps_r: f64) -> Self {
        Self {
            wavenumber,
            radius,
            eps_r,
        }
    }

    /// Size parameter `k a`
    pub fn size_parameter(&self) -> f64 {
        self.wavenumber * self.radius
    }

    /// Clausius-Mossotti polarizability `a³ (ε−1)/(ε+2)`
    pub fn polarizability(&self) -> f64 {
        self.radius.powi(3) * (self.eps_r - 1.0) / (self.eps_r + 2.0)
    }

    /// Ratio of the uniform interior field to the incident field
    pub fn interior_factor(&self) -> f64 {
        3.0 / (self.eps_r + 2.0)
    }

    /// Interior field at `x`
    pub fn interior_field(&self, incident: &IncidentPlaneWave, x: &Vec3) -> CVec3 {
        let factor = self.interior_factor();
        incident.field(x).map(|c| c * factor)
    }

    /// Dipole field scattered to the exterior point `x`
    pub fn scattered_field(&self, incident: &IncidentPlaneWave, x: &Vec3) -> CVec3 {
        let k = self.wavenumber;
        let r = norm(x);
        let n = scale(1.0 / r, x);
        // Dipole at the origin, driven by the incident field there
        let e0 = incident.field(&[0.0, 0.0, 0.0]);
        let p: CVec3 = e0.map(|c| c * self.polarizability());
        let n_dot_p = cdot_real(&p, &n);
        let phase = Complex64::new(0.0, k * r).exp();
        let near = Complex64::new(1.0 / r.powi(3), -k / (r * r));
        let mut field = [Complex64::new(0.0, 0.0); 3];
        for c in 0..3 {
            // (n×p)×n = p − n(n·p)
            let transverse = p[c] - n_dot_p * n[c];
            let static_part = n_dot_p * (3.0 * n[c]) - p[c];
            field[c] = phase * (transverse * (k * k / r) + static_part * near);
        }
        field
    }

    /// Upper bound of `|E_s|²` at distance `r` for a unit incident amplitude
    pub fn scattered_intensity_bound(&self, r: f64) -> f64 {
        let kr = self.wavenumber * r;
        let amplitude = self.polarizability().abs() * self.wavenumber.powi(2) / r
            * (1.0 + 2.0 / kr + 2.0 / (kr * kr));
        amplitude * amplitude
    }
}

/// Error metrics of computed field samples against a reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Relative L2 error over all components
    pub l2_relative: f64,
    /// Largest pointwise error `|E − E_ref|`
    pub linf: f64,
    /// Largest pointwise error relative to `|E_ref|`
    pub max_relative: f64,
}

impl ErrorMetrics {
    /// Compare two equally long lists of field vectors
    pub fn compute(reference: &[CVec3], computed: &[CVec3]) -> Self {
        assert_eq!(reference.len(), computed.len());
        let vector_norm = |v: &CVec3| v.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        let pointwise: Vec<(f64, f64)> = reference
            .iter()
            .zip(computed)
            .map(|(a, b)| {
                let diff = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
                (vector_norm(&diff), vector_norm(a))
            })
            .collect();

        let error_sq: f64 = pointwise.iter().map(|(e, _)| e * e).sum();
        let reference_sq: f64 = pointwise.iter().map(|(_, r)| r * r).sum();
        let l2_relative = if reference_sq > 1e-30 {
            (error_sq / reference_sq).sqrt()
        } else {
            error_sq.sqrt()
        };
        let linf = pointwise.iter().map(|(e, _)| *e).fold(0.0_f64, f64::max);
        let max_relative = pointwise
            .iter()
            .map(|(e, r)| if *r > 1e-15 { e / r } else { *e })
            .fold(0.0_f64, f64::max);

        Self {
            l2_relative,
            linf,
            max_relative,
        }
    }
}

/// Result of one validation run, exported for plotting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Test name
    pub test_name: String,
    /// Reference problem
    pub reference: RayleighSphere,
    /// Number of triangles of the mesh
    pub num_triangles: usize,
    /// Observation points
    pub positions: Vec<[f64; 3]>,
    /// `|E|²` computed by the solver
    pub computed_intensity: Vec<f64>,
    /// `|E|²` of the reference
    pub reference_intensity: Vec<f64>,
    /// Error metrics of the complex fields
    pub errors: ErrorMetrics,
    /// Git commit of the library
    pub git_commit: String,
    /// Library version
    pub version: String,
}

impl ValidationReport {
    /// Assemble a report from computed and reference fields
    pub fn new(
        test_name: impl Into<String>,
        reference: RayleighSphere,
        num_triangles: usize,
        positions: Vec<Vec3>,
        reference_field: &[CVec3],
        computed_field: &[CVec3],
    ) -> Self {
        let intensity =
            |field: &[CVec3]| -> Vec<f64> { field.iter().map(crate::core::vector::intensity).collect() };
        Self {
            test_name: test_name.into(),
            reference,
            num_triangles,
            positions,
            computed_intensity: intensity(computed_field),
            reference_intensity: intensity(reference_field),
            errors: ErrorMetrics::compute(reference_field, computed_field),
            git_commit: crate::GIT_HASH.to_string(),
            version: crate::VERSION.to_string(),
        }
    }

    /// Save to JSON file
    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Check the relative L2 error against a threshold
    pub fn passed(&self, l2_threshold: f64) -> bool {
        self.errors.l2_relative < l2_threshold
    }
}

/// Directory for validation output, created on demand
pub fn output_dir(name: &str) -> anyhow::Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("org", "spinorama", "math-audio")
        .ok_or_else(|| anyhow::anyhow!("failed to determine project directories"))?;
    let dir = proj_dirs.cache_dir().join("maxwell").join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_factors() {
        let sphere = RayleighSphere::new(0.1, 1.0, 4.0);
        assert_relative_eq!(sphere.polarizability(), 0.5);
        assert_relative_eq!(sphere.interior_factor(), 0.5);
        assert_relative_eq!(sphere.size_parameter(), 0.1);
        assert_relative_eq!(RayleighSphere::new(0.1, 1.0, 1.0).polarizability(), 0.0);
    }

    #[test]
    fn test_static_dipole_field_on_axis() {
        // Along the polarization, the near field is 2p/r³
        let sphere = RayleighSphere::new(1e-6, 1.0, 4.0);
        let incident = IncidentPlaneWave::in_xy_plane(sphere.wavenumber, 0.0).unwrap();
        let field = sphere.scattered_field(&incident, &[0.0, 0.0, 2.0]);
        assert_relative_eq!(field[2].re, 2.0 * 0.5 / 8.0, max_relative = 1e-6);
        assert!(field[0].norm() < 1e-12);

        // Broadside the near field is −p/r³
        let field = sphere.scattered_field(&incident, &[2.0, 0.0, 0.0]);
        assert_relative_eq!(field[2].re, -0.5 / 8.0, max_relative = 1e-6);
    }

    #[test]
    fn test_bound_holds() {
        let sphere = RayleighSphere::new(0.3, 1.0, 2.1);
        let incident = IncidentPlaneWave::in_xy_plane(0.3, 0.0).unwrap();
        for x in [[10.0, 0.0, 0.0], [0.0, 5.0, 0.0], [3.0, 0.0, 4.0]] {
            let i = crate::core::vector::intensity(&sphere.scattered_field(&incident, &x));
            assert!(i <= sphere.scattered_intensity_bound(norm(&x)));
        }
    }

    #[test]
    fn test_error_metrics() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let reference = vec![[one, zero, zero], [zero, one, zero]];
        let computed = vec![[one, zero, zero], [zero, one * 1.1, zero]];
        let metrics = ErrorMetrics::compute(&reference, &computed);
        assert_relative_eq!(metrics.linf, 0.1, epsilon = 1e-12);
        assert_relative_eq!(metrics.max_relative, 0.1, epsilon = 1e-12);
        assert_relative_eq!(metrics.l2_relative, 0.1 / 2.0_f64.sqrt(), epsilon = 1e-12);
    }
}
