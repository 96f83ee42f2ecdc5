//! Dense Galerkin assembly of the Maxwell boundary operators
//!
//! For RWG trial functions `f_n` and test functions `f_m`
//!
//! ```text
//! E_mn = ik ∫∫ G f_m·f_n + (1/ik) ∫∫ G div f_m div f_n
//! H_mn = ∫∫ f_m(x) · (∇ₓG × f_n(y))
//! ```
//!
//! The test space is the rotated RWG space. For tangential fields
//! `⟨u × ν, f × ν⟩ = ⟨u, f⟩`, so the plain RWG values appear in the
//! integrands.
//!
//! Element pairs closer than `near_field_factor` times the larger diameter
//! use singularity subtraction: the static kernels are integrated
//! analytically over the trial triangle and only the smooth remainder goes
//! through quadrature. Coincident triangles contribute nothing to `H`.

use ndarray::Array2;
use num_complex::Complex64;

use super::{OperatorAssembler, OperatorBlocks};
use crate::core::constants::PI4;
use crate::core::error::AssemblyError;
use crate::core::integration::{HelmholtzKernel, TriangleRule, static_integrals, triangle_rule};
use crate::core::mesh::TriangleMesh;
use crate::core::parallel::map_indexed;
use crate::core::space::{FunctionSpace, MultitraceSpaces};
use crate::core::types::{Device, QuadratureConfig};
use crate::core::vector::{Vec3, add, cross, distance, dot, scale, sub};

/// Test triangles processed per parallel batch
const ASSEMBLY_BATCH: usize = 64;

const CZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Dense O(N²) assembler
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseAssembler {
    quadrature: QuadratureConfig,
    device: Device,
}

impl DenseAssembler {
    /// Create an assembler with the given quadrature and compute backend
    pub fn new(quadrature: QuadratureConfig, device: Device) -> Self {
        Self { quadrature, device }
    }

    /// Quadrature settings
    pub fn quadrature(&self) -> &QuadratureConfig {
        &self.quadrature
    }

    /// Compute backend
    pub fn device(&self) -> Device {
        self.device
    }

    /// Rows of both operators belonging to the test functions of triangle `tm`
    fn triangle_strip(
        &self,
        space: &FunctionSpace,
        kernel: &HelmholtzKernel,
        quadrature: &TriangleQuadrature,
        tm: usize,
    ) -> TriangleStrip {
        let mesh = space.mesh();
        let n = space.global_dof_count();
        let test_basis = space.local_basis(tm);
        let mut electric = Array2::zeros((test_basis.len(), n));
        let mut magnetic = Array2::zeros((test_basis.len(), n));

        let ik = kernel.ik();
        let inv_ik = ik.inv();
        let centroid_m = mesh.centroid(tm);
        let diameter_m = mesh.diameter(tm);

        for tn in 0..mesh.num_triangles() {
            let trial_basis = space.local_basis(tn);
            let near = distance(&centroid_m, &mesh.centroid(tn))
                < self.quadrature.near_field_factor * diameter_m.max(mesh.diameter(tn));
            let same = tm == tn;
            let corners_n = mesh.corners(tn);
            let normal_n = mesh.normal(tn);

            let mut e_loc = [[CZERO; 3]; 3];
            let mut h_loc = [[CZERO; 3]; 3];

            for &(x, wx) in quadrature.points(tm, near) {
                let mut fm = [[0.0; 3]; 3];
                for (a, bm) in test_basis.iter().enumerate() {
                    fm[a] = bm.value(&x);
                }

                for &(y, wy) in quadrature.points(tn, near) {
                    let r = distance(&x, &y);
                    let (g, g1) = if !near {
                        (kernel.green(r), kernel.gradient_factor(r))
                    } else if same {
                        (kernel.green_regular(r), CZERO)
                    } else {
                        (kernel.green_regular(r), kernel.gradient_factor_regular(r))
                    };
                    let w = wx * wy;
                    let xy = sub(&x, &y);
                    for (b, bn) in trial_basis.iter().enumerate() {
                        let fn_y = bn.value(&y);
                        // (x − y) × f_n(y) = c_n (x − y) × (x − p_n)
                        let rot = cross(&xy, &sub(&x, &bn.free_vertex));
                        for (a, bm) in test_basis.iter().enumerate() {
                            e_loc[a][b] += w
                                * g
                                * (ik * dot(&fm[a], &fn_y)
                                    + bm.divergence * bn.divergence * inv_ik);
                            h_loc[a][b] += w * g1 * bn.coefficient * dot(&fm[a], &rot);
                        }
                    }
                }

                if near {
                    let s = static_integrals(&corners_n, &normal_n, &x);
                    let grad = scale(-1.0 / PI4, &s.gradient);
                    for (b, bn) in trial_basis.iter().enumerate() {
                        let x_p = sub(&x, &bn.free_vertex);
                        let fv = scale(
                            bn.coefficient,
                            &add(&s.vector, &scale(s.inverse_distance, &x_p)),
                        );
                        let hv = cross(&grad, &x_p);
                        for (a, bm) in test_basis.iter().enumerate() {
                            e_loc[a][b] += wx
                                * (ik * dot(&fm[a], &fv)
                                    + bm.divergence * bn.divergence * s.inverse_distance * inv_ik)
                                / PI4;
                            if !same {
                                h_loc[a][b] += wx * bn.coefficient * dot(&fm[a], &hv);
                            }
                        }
                    }
                }
            }

            for a in 0..test_basis.len() {
                for (b, bn) in trial_basis.iter().enumerate() {
                    electric[[a, bn.dof]] += e_loc[a][b];
                    magnetic[[a, bn.dof]] += h_loc[a][b];
                }
            }
        }

        TriangleStrip {
            dofs: test_basis.iter().map(|b| b.dof).collect(),
            electric,
            magnetic,
        }
    }
}

impl OperatorAssembler for DenseAssembler {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn assemble(
        &self,
        spaces: &MultitraceSpaces,
        wavenumber: f64,
    ) -> Result<OperatorBlocks, AssemblyError> {
        if !(wavenumber.is_finite() && wavenumber > 0.0) {
            return Err(AssemblyError::InvalidWavenumber { wavenumber });
        }
        let factor = self.quadrature.near_field_factor;
        if !(factor.is_finite() && factor >= 0.0) {
            return Err(AssemblyError::InvalidParameter {
                name: "near_field_factor",
                value: factor,
            });
        }
        if !spaces.domain.shares_dofs_with(&spaces.dual_to_range)
            || !spaces.domain.shares_dofs_with(&spaces.range)
        {
            return Err(AssemblyError::IncompatibleSpaces(
                "domain, range and dual-to-range must share degrees of freedom".to_string(),
            ));
        }

        let space = &spaces.domain;
        let mesh = space.mesh();
        let n = space.global_dof_count();
        let num_triangles = mesh.num_triangles();
        let kernel = HelmholtzKernel::new(wavenumber);
        let quadrature = TriangleQuadrature::new(mesh, &self.quadrature)?;

        let mut electric = Array2::<Complex64>::zeros((n, n));
        let mut magnetic = Array2::<Complex64>::zeros((n, n));

        // Strips are scattered in triangle order so the result does not depend on the device
        let mut start = 0;
        while start < num_triangles {
            let end = (start + ASSEMBLY_BATCH).min(num_triangles);
            let strips = map_indexed(end - start, self.device, |i| {
                self.triangle_strip(space, &kernel, &quadrature, start + i)
            });
            for strip in strips {
                for (row, &dof) in strip.dofs.iter().enumerate() {
                    electric
                        .row_mut(dof)
                        .zip_mut_with(&strip.electric.row(row), |acc, v| *acc += *v);
                    magnetic
                        .row_mut(dof)
                        .zip_mut_with(&strip.magnetic.row(row), |acc, v| *acc += *v);
                }
            }
            start = end;
        }

        check_finite("electric", &electric)?;
        check_finite("magnetic", &magnetic)?;

        log::debug!(
            "Assembled dense operators: k = {:.6}, {} dofs, {} triangles",
            wavenumber,
            n,
            num_triangles
        );

        Ok(OperatorBlocks {
            wavenumber,
            electric,
            magnetic,
        })
    }
}

/// Physical quadrature points of every triangle for both rules
struct TriangleQuadrature {
    regular: Vec<Vec<(Vec3, f64)>>,
    near: Vec<Vec<(Vec3, f64)>>,
}

impl TriangleQuadrature {
    fn new(mesh: &TriangleMesh, config: &QuadratureConfig) -> Result<Self, AssemblyError> {
        let regular_rule = triangle_rule(config.regular_points)?;
        let near_rule = triangle_rule(config.near_points)?;
        let map = |rule: &TriangleRule| -> Vec<Vec<(Vec3, f64)>> {
            (0..mesh.num_triangles())
                .map(|t| rule.map_to(&mesh.corners(t), mesh.area(t)))
                .collect()
        };
        Ok(Self {
            regular: map(&regular_rule),
            near: map(&near_rule),
        })
    }

    #[inline]
    fn points(&self, t: usize, near: bool) -> &[(Vec3, f64)] {
        if near { &self.near[t] } else { &self.regular[t] }
    }
}

/// Operator rows of the test functions supported on one triangle
struct TriangleStrip {
    dofs: Vec<usize>,
    electric: Array2<Complex64>,
    magnetic: Array2<Complex64>,
}

fn check_finite(operator: &'static str, matrix: &Array2<Complex64>) -> Result<(), AssemblyError> {
    match matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), _)) => Err(AssemblyError::NonFiniteEntry { operator, row, col }),
        None => Ok(()),
    }
}
