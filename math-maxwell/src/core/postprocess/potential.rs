//! Electric and magnetic potential operators
//!
//! For a surface current `p = Σ c_j f_j`
//!
//! ```text
//! 𝓔p(x) = ik ∫ G p dy − (1/ik) ∫ ∇ₓG div p dy
//! 𝓗p(x) = ∫ ∇ₓG × p dy
//! ```
//!
//! with `∇ₓG = (x − y) g₁(|x − y|)`. Triangles close to the observation point
//! use the same singularity subtraction as operator assembly.

use ndarray::Array2;
use num_complex::Complex64;

use crate::core::constants::PI4;
use crate::core::error::{AssemblyError, EvaluationError};
use crate::core::integration::{HelmholtzKernel, TriangleRule, static_integrals, triangle_rule};
use crate::core::parallel::map_indexed;
use crate::core::space::{FunctionSpace, GridFunction};
use crate::core::types::{Device, QuadratureConfig};
use crate::core::vector::{CVec3, CZERO3, Vec3, add, cross, distance, scale, sub};

/// Which potential operator to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotentialKind {
    /// Electric-field potential 𝓔
    Electric,
    /// Magnetic-field potential 𝓗
    Magnetic,
}

/// Potential values at a batch of points
#[derive(Debug, Clone)]
pub struct PotentialField {
    /// `m × 3`; rows of failed points hold NaN
    pub values: Array2<Complex64>,
    /// Failures, indexed by row of the evaluated point array
    pub errors: Vec<EvaluationError>,
}

/// Applies potential operators to surface currents on one space
#[derive(Debug, Clone)]
pub struct PotentialEvaluator<'a> {
    space: &'a FunctionSpace,
    quadrature: QuadratureConfig,
    device: Device,
    surface_tolerance: f64,
    regular: Vec<Vec<(Vec3, f64)>>,
    near: Vec<Vec<(Vec3, f64)>>,
}

impl<'a> PotentialEvaluator<'a> {
    /// Evaluator on `space`; points within `surface_tolerance` of the mesh are rejected
    pub fn new(
        space: &'a FunctionSpace,
        quadrature: QuadratureConfig,
        surface_tolerance: f64,
    ) -> Result<Self, AssemblyError> {
        let mesh = space.mesh();
        let map = |rule: &TriangleRule| -> Vec<Vec<(Vec3, f64)>> {
            (0..mesh.num_triangles())
                .map(|t| rule.map_to(&mesh.corners(t), mesh.area(t)))
                .collect()
        };
        let regular = map(&triangle_rule(quadrature.regular_points)?);
        let near = map(&triangle_rule(quadrature.near_points)?);
        Ok(Self {
            space,
            quadrature,
            device: Device::default(),
            surface_tolerance,
            regular,
            near,
        })
    }

    /// Compute backend for batch evaluation
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Space of the surface currents
    pub fn space(&self) -> &FunctionSpace {
        self.space
    }

    /// Apply the electric potential to `density` at every row of `points`
    pub fn electric(
        &self,
        wavenumber: f64,
        density: &GridFunction,
        points: &Array2<f64>,
    ) -> Result<PotentialField, AssemblyError> {
        self.evaluate(PotentialKind::Electric, wavenumber, density, points)
    }

    /// Apply the magnetic potential to `density` at every row of `points`
    pub fn magnetic(
        &self,
        wavenumber: f64,
        density: &GridFunction,
        points: &Array2<f64>,
    ) -> Result<PotentialField, AssemblyError> {
        self.evaluate(PotentialKind::Magnetic, wavenumber, density, points)
    }

    /// Apply a potential operator at every row of an `(m × 3)` point array
    pub fn evaluate(
        &self,
        kind: PotentialKind,
        wavenumber: f64,
        density: &GridFunction,
        points: &Array2<f64>,
    ) -> Result<PotentialField, AssemblyError> {
        if !(wavenumber.is_finite() && wavenumber > 0.0) {
            return Err(AssemblyError::InvalidWavenumber { wavenumber });
        }
        if !density.space().shares_dofs_with(self.space) {
            return Err(AssemblyError::IncompatibleSpaces(
                "surface current lives on a different function space".to_string(),
            ));
        }
        let coefficients: Vec<Complex64> = density
            .coefficients()
            .ok_or_else(|| {
                AssemblyError::IncompatibleSpaces(
                    "potentials need expansion coefficients, not projections".to_string(),
                )
            })?
            .to_vec();
        let kernel = HelmholtzKernel::new(wavenumber);

        let results = map_indexed(points.nrows(), self.device, |i| {
            let row = points.row(i);
            let x = [row[0], row[1], row[2]];
            self.point_value(kind, &kernel, &coefficients, i, &x)
        });

        let nan = Complex64::new(f64::NAN, f64::NAN);
        let mut values = Array2::from_elem((points.nrows(), 3), nan);
        let mut errors = Vec::new();
        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(v) => {
                    for (c, value) in v.iter().enumerate() {
                        values[[i, c]] = *value;
                    }
                }
                Err(err) => errors.push(err),
            }
        }
        Ok(PotentialField { values, errors })
    }

    fn point_value(
        &self,
        kind: PotentialKind,
        kernel: &HelmholtzKernel,
        coefficients: &[Complex64],
        index: usize,
        x: &Vec3,
    ) -> Result<CVec3, EvaluationError> {
        let mesh = self.space.mesh();
        let distance_to_mesh = mesh.distance_to(x);
        if distance_to_mesh <= self.surface_tolerance {
            return Err(EvaluationError::OnSurface {
                index,
                distance: distance_to_mesh,
            });
        }

        let ik = kernel.ik();
        let inv_ik = ik.inv();
        let mut total = CZERO3;

        for tn in 0..mesh.num_triangles() {
            let basis = self.space.local_basis(tn);
            if basis.iter().all(|b| coefficients[b.dof] == Complex64::new(0.0, 0.0)) {
                continue;
            }
            let near = distance(x, &mesh.centroid(tn))
                < self.quadrature.near_field_factor * mesh.diameter(tn);
            let points = if near { &self.near[tn] } else { &self.regular[tn] };

            let mut local = [CZERO3; 3];
            for &(y, wy) in points {
                let r = distance(x, &y);
                let (g, g1) = if near {
                    (kernel.green_regular(r), kernel.gradient_factor_regular(r))
                } else {
                    (kernel.green(r), kernel.gradient_factor(r))
                };
                let xy = sub(x, &y);
                for (b, bn) in basis.iter().enumerate() {
                    let term = match kind {
                        PotentialKind::Electric => {
                            let a = wy * ik * g * bn.coefficient;
                            let d = -wy * bn.divergence * g1 * inv_ik;
                            let f = sub(&y, &bn.free_vertex);
                            [
                                a * f[0] + d * xy[0],
                                a * f[1] + d * xy[1],
                                a * f[2] + d * xy[2],
                            ]
                        }
                        PotentialKind::Magnetic => {
                            let rot = cross(&xy, &sub(x, &bn.free_vertex));
                            let a = wy * g1 * bn.coefficient;
                            [a * rot[0], a * rot[1], a * rot[2]]
                        }
                    };
                    for c in 0..3 {
                        local[b][c] += term[c];
                    }
                }
            }

            if near {
                let s = static_integrals(&mesh.corners(tn), &mesh.normal(tn), x);
                for (b, bn) in basis.iter().enumerate() {
                    let x_p = sub(x, &bn.free_vertex);
                    let term = match kind {
                        PotentialKind::Electric => {
                            let fv = scale(
                                bn.coefficient,
                                &add(&s.vector, &scale(s.inverse_distance, &x_p)),
                            );
                            let a = ik / PI4;
                            let d = bn.divergence * inv_ik / PI4;
                            [
                                a * fv[0] + d * s.gradient[0],
                                a * fv[1] + d * s.gradient[1],
                                a * fv[2] + d * s.gradient[2],
                            ]
                        }
                        PotentialKind::Magnetic => {
                            let hv = cross(&scale(-bn.coefficient / PI4, &s.gradient), &x_p);
                            [hv[0].into(), hv[1].into(), hv[2].into()]
                        }
                    };
                    for c in 0..3 {
                        local[b][c] += term[c];
                    }
                }
            }

            for (b, bn) in basis.iter().enumerate() {
                let coefficient = coefficients[bn.dof];
                for c in 0..3 {
                    total[c] += coefficient * local[b][c];
                }
            }
        }

        if total.iter().all(|v| v.is_finite()) {
            Ok(total)
        } else {
            Err(EvaluationError::NonFinite { index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::{MeshValidation, icosphere};
    use crate::core::types::{MediumTag, Side};
    use ndarray::{Array1, array};
    use std::sync::Arc;

    fn space() -> FunctionSpace {
        let mesh = Arc::new(icosphere(1.0, 1).unwrap());
        FunctionSpace::rwg(mesh, &MeshValidation::default()).unwrap()
    }

    fn density(space: &FunctionSpace, seed: f64) -> GridFunction {
        let coefficients = Array1::from_shape_fn(space.global_dof_count(), |i| {
            let t = i as f64 * 0.37 + seed;
            Complex64::new(t.sin(), (1.3 * t).cos())
        });
        let tag = MediumTag {
            side: Side::Exterior,
            wavenumber: 1.0,
        };
        GridFunction::from_coefficients(space, coefficients, tag).unwrap()
    }

    fn max_rel_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
        let scale = b.iter().map(|v| v.norm()).fold(0.0, f64::max);
        (a - b).iter().map(|v| v.norm()).fold(0.0, f64::max) / scale
    }

    #[test]
    fn test_potentials_are_linear() {
        let space = space();
        let evaluator = PotentialEvaluator::new(&space, QuadratureConfig::default(), 1e-10).unwrap();
        let points = array![[1.6, 0.3, 0.2], [0.0, -2.5, 1.0], [0.2, 0.1, -0.3]];
        let p = density(&space, 0.0);
        let q = density(&space, 1.7);
        let sum = GridFunction::from_coefficients(
            &space,
            p.coefficients().unwrap() + &(q.coefficients().unwrap() * Complex64::new(0.0, 2.0)),
            p.medium(),
        )
        .unwrap();

        for kind in [PotentialKind::Electric, PotentialKind::Magnetic] {
            let fp = evaluator.evaluate(kind, 1.0, &p, &points).unwrap().values;
            let fq = evaluator.evaluate(kind, 1.0, &q, &points).unwrap().values;
            let fs = evaluator.evaluate(kind, 1.0, &sum, &points).unwrap().values;
            let expected = &fp + &(&fq * Complex64::new(0.0, 2.0));
            assert!(max_rel_diff(&fs, &expected) < 1e-12);
        }
    }

    #[test]
    fn test_near_field_threshold_does_not_change_result() {
        let space = space();
        let points = array![[1.6, 0.3, 0.2], [1.3, 0.0, 0.1]];
        let p = density(&space, 0.4);
        let evaluate = |factor: f64, kind: PotentialKind| {
            let quadrature = QuadratureConfig {
                near_field_factor: factor,
                ..QuadratureConfig::default()
            };
            PotentialEvaluator::new(&space, quadrature, 1e-10)
                .unwrap()
                .evaluate(kind, 1.0, &p, &points)
                .unwrap()
                .values
        };
        for kind in [PotentialKind::Electric, PotentialKind::Magnetic] {
            let a = evaluate(2.0, kind);
            let b = evaluate(6.0, kind);
            assert!(max_rel_diff(&a, &b) < 1e-4);
        }
    }

    #[test]
    fn test_points_on_surface_get_sentinel() {
        let space = space();
        let evaluator = PotentialEvaluator::new(&space, QuadratureConfig::default(), 1e-10).unwrap();
        let v = space.mesh().vertices()[3];
        let points = array![[3.0, 0.0, 0.0], [v[0], v[1], v[2]]];
        let field = evaluator
            .electric(1.0, &density(&space, 0.0), &points)
            .unwrap();
        assert!(field.values.row(0).iter().all(|c| c.is_finite()));
        assert!(field.values.row(1).iter().all(|c| c.re.is_nan() && c.im.is_nan()));
        assert_eq!(field.errors.len(), 1);
        assert!(matches!(field.errors[0], EvaluationError::OnSurface { index: 1, .. }));
    }

    #[test]
    fn test_projections_are_rejected() {
        let space = space();
        let evaluator = PotentialEvaluator::new(&space, QuadratureConfig::default(), 1e-10).unwrap();
        let tag = MediumTag {
            side: Side::Exterior,
            wavenumber: 1.0,
        };
        let rule = triangle_rule(1).unwrap();
        let projected = GridFunction::from_trace(&space, &space.rotated(), tag, &rule, |_, _| {
            CZERO3
        })
        .unwrap();
        let points = array![[3.0, 0.0, 0.0]];
        assert!(matches!(
            evaluator.magnetic(1.0, &projected, &points),
            Err(AssemblyError::IncompatibleSpaces(_))
        ));
        assert!(matches!(
            evaluator.magnetic(-1.0, &density(&space, 0.0), &points),
            Err(AssemblyError::InvalidWavenumber { .. })
        ));
    }

    #[test]
    fn test_devices_agree() {
        let space = space();
        let points = array![[1.6, 0.3, 0.2], [0.0, -2.5, 1.0], [0.2, 0.1, -0.3]];
        let p = density(&space, 0.9);
        let seq = PotentialEvaluator::new(&space, QuadratureConfig::default(), 1e-10)
            .unwrap()
            .with_device(Device::Sequential)
            .electric(0.8, &p, &points)
            .unwrap();
        let par = PotentialEvaluator::new(&space, QuadratureConfig::default(), 1e-10)
            .unwrap()
            .with_device(Device::Parallel)
            .electric(0.8, &p, &points)
            .unwrap();
        assert_eq!(seq.values, par.values);
    }
}
