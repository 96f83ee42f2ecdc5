//! Functions on a discrete surface space

use ndarray::Array1;
use num_complex::Complex64;

use super::FunctionSpace;
use crate::core::error::AssemblyError;
use crate::core::integration::TriangleRule;
use crate::core::types::MediumTag;
use crate::core::vector::{CVec3, CZERO3, Vec3, cadd_assign, cdot_real, cscale};

/// How the data of a grid function is stored
#[derive(Debug, Clone, PartialEq)]
pub enum GridData {
    /// Galerkin projections `⟨g, ψ_m⟩` onto the basis of the dual space
    Projections(Array1<Complex64>),
    /// Expansion coefficients in the basis of the space
    Coefficients(Array1<Complex64>),
}

/// A coefficient vector over a function space, tagged with its medium
#[derive(Debug, Clone)]
pub struct GridFunction {
    space: FunctionSpace,
    dual_space: Option<FunctionSpace>,
    data: GridData,
    medium: MediumTag,
}

impl GridFunction {
    /// Project a tangential trace `g(x, ν)` onto the basis of `dual_space`
    ///
    /// `projections[m] = ∫ g(x, ν(x)) · ψ_m(x) dx` with ψ the dual basis.
    pub fn from_trace<F>(
        space: &FunctionSpace,
        dual_space: &FunctionSpace,
        medium: MediumTag,
        rule: &TriangleRule,
        trace: F,
    ) -> Result<Self, AssemblyError>
    where
        F: Fn(&Vec3, &Vec3) -> CVec3,
    {
        if !space.shares_dofs_with(dual_space) {
            return Err(AssemblyError::IncompatibleSpaces(
                "dual space does not share the degrees of freedom of the space".to_string(),
            ));
        }
        let mesh = dual_space.mesh();
        let mut projections = Array1::zeros(dual_space.global_dof_count());

        for t in 0..mesh.num_triangles() {
            let normal = mesh.normal(t);
            for (x, w) in rule.map_to(&mesh.corners(t), mesh.area(t)) {
                let g = trace(&x, &normal);
                for basis in dual_space.local_basis(t) {
                    let psi = dual_space.basis_value(basis, t, &x);
                    projections[basis.dof] += w * cdot_real(&g, &psi);
                }
            }
        }

        Ok(Self {
            space: space.clone(),
            dual_space: Some(dual_space.clone()),
            data: GridData::Projections(projections),
            medium,
        })
    }

    /// Wrap expansion coefficients
    pub fn from_coefficients(
        space: &FunctionSpace,
        coefficients: Array1<Complex64>,
        medium: MediumTag,
    ) -> Result<Self, AssemblyError> {
        if coefficients.len() != space.global_dof_count() {
            return Err(AssemblyError::IncompatibleSpaces(format!(
                "{} coefficients for a space with {} degrees of freedom",
                coefficients.len(),
                space.global_dof_count()
            )));
        }
        Ok(Self {
            space: space.clone(),
            dual_space: None,
            data: GridData::Coefficients(coefficients),
            medium,
        })
    }

    /// Space the function lives on
    pub fn space(&self) -> &FunctionSpace {
        &self.space
    }

    /// Dual space of the projections, if any
    pub fn dual_space(&self) -> Option<&FunctionSpace> {
        self.dual_space.as_ref()
    }

    /// Medium tag
    pub fn medium(&self) -> MediumTag {
        self.medium
    }

    /// Raw data
    pub fn data(&self) -> &GridData {
        &self.data
    }

    /// Projections, when the function was built from a trace
    pub fn projections(&self) -> Option<&Array1<Complex64>> {
        match &self.data {
            GridData::Projections(p) => Some(p),
            GridData::Coefficients(_) => None,
        }
    }

    /// Coefficients, when the function was built from an expansion
    pub fn coefficients(&self) -> Option<&Array1<Complex64>> {
        match &self.data {
            GridData::Coefficients(c) => Some(c),
            GridData::Projections(_) => None,
        }
    }

    /// Surface field `Σ c_j f_j(x)` at a point of triangle `t`
    ///
    /// Only defined for coefficient data.
    pub fn evaluate(&self, t: usize, x: &Vec3) -> Option<CVec3> {
        let coefficients = self.coefficients()?;
        let mut value = CZERO3;
        for basis in self.space.local_basis(t) {
            let f = self.space.basis_value(basis, t, x);
            cadd_assign(&mut value, &cscale(coefficients[basis.dof], &f));
        }
        Some(value)
    }
}
