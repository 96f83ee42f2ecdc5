//! Multitrace operators and the combined linear system
//!
//! The multitrace operator of a homogeneous medium with impedance ratio
//! `ρ = √(μ_r/ε_r)` acts on the pair (tangential, Neumann) of surface traces:
//!
//! ```text
//! A = [  H     ρ E ]
//!     [ −E/ρ    H  ]
//! ```
//!
//! The scattering system adds the operators of both sides of the interface,
//! `A = A_ext(k_ext) + A_int(k_int, ε_r, μ_r)`, acting on one shared set of
//! unknowns. Neither operator is used on its own: the sum is free of the
//! spurious interior resonances of single-medium formulations.

use ndarray::{Array1, Array2, ArrayView2, s};
use num_complex::Complex64;

use super::OperatorAssembler;
use crate::core::error::AssemblyError;
use crate::core::incident::IncidentPlaneWave;
use crate::core::integration::TriangleRule;
use crate::core::space::{FunctionSpace, GridFunction, MultitraceSpaces};
use crate::core::types::{Medium, MediumTag, PhysicsParams};

/// 2×2 block operator on (tangential, Neumann) traces
#[derive(Debug, Clone)]
pub struct MultitraceOperator {
    domain: FunctionSpace,
    media: Vec<MediumTag>,
    matrix: Array2<Complex64>,
}

impl MultitraceOperator {
    /// Assemble the multitrace operator of one medium
    pub fn assemble(
        assembler: &dyn OperatorAssembler,
        spaces: &MultitraceSpaces,
        medium: &Medium,
    ) -> Result<Self, AssemblyError> {
        medium.validate()?;
        let blocks = assembler.assemble(spaces, medium.wavenumber)?;
        let n = blocks.num_dofs();
        let rho = medium.impedance_ratio();

        let mut matrix = Array2::zeros((2 * n, 2 * n));
        matrix.slice_mut(s![..n, ..n]).assign(&blocks.magnetic);
        matrix
            .slice_mut(s![..n, n..])
            .assign(&blocks.electric.mapv(|v| v * rho));
        matrix
            .slice_mut(s![n.., ..n])
            .assign(&blocks.electric.mapv(|v| -v / rho));
        matrix.slice_mut(s![n.., n..]).assign(&blocks.magnetic);

        log::debug!(
            "Multitrace operator ({:?}, k = {:.6}, rho = {:.6}) via {} assembler",
            medium.side,
            medium.wavenumber,
            rho,
            assembler.name()
        );

        Ok(Self {
            domain: spaces.domain.clone(),
            media: vec![medium.tag()],
            matrix,
        })
    }

    /// Sum of two operators on the same degrees of freedom
    pub fn add(&self, other: &MultitraceOperator) -> Result<Self, AssemblyError> {
        if !self.domain.shares_dofs_with(&other.domain) {
            return Err(AssemblyError::IncompatibleSpaces(
                "multitrace operators are defined on different function spaces".to_string(),
            ));
        }
        let media = self.media.iter().chain(&other.media).copied().collect();
        Ok(Self {
            domain: self.domain.clone(),
            media,
            matrix: &self.matrix + &other.matrix,
        })
    }

    /// Number of surface degrees of freedom per trace
    pub fn num_dofs(&self) -> usize {
        self.matrix.nrows() / 2
    }

    /// Domain space
    pub fn domain(&self) -> &FunctionSpace {
        &self.domain
    }

    /// Media whose operators make up this one
    pub fn media(&self) -> &[MediumTag] {
        &self.media
    }

    /// Full `2N × 2N` matrix
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Block `(row, col)` with 0 = tangential and 1 = Neumann
    pub fn block(&self, row: usize, col: usize) -> ArrayView2<'_, Complex64> {
        let n = self.num_dofs();
        self.matrix
            .slice(s![row * n..(row + 1) * n, col * n..(col + 1) * n])
    }

    /// Consume the operator and return its matrix
    pub fn into_matrix(self) -> Array2<Complex64> {
        self.matrix
    }
}

/// The combined system `A x = b`
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// `A_ext + A_int`, `2N × 2N`
    pub matrix: Array2<Complex64>,
    /// Projected incident traces: tangential, then Neumann
    pub rhs: [GridFunction; 2],
    /// Trial space of the unknowns
    pub domain: FunctionSpace,
    /// Exterior medium
    pub exterior: MediumTag,
    /// Interior medium
    pub interior: MediumTag,
}

impl LinearSystem {
    /// Number of surface degrees of freedom per trace
    pub fn num_dofs(&self) -> usize {
        self.domain.global_dof_count()
    }

    /// Concatenated right-hand side vector
    pub fn rhs_vector(&self) -> Result<Array1<Complex64>, AssemblyError> {
        let n = self.num_dofs();
        let mut rhs = Array1::zeros(2 * n);
        for (block, gf) in self.rhs.iter().enumerate() {
            let projections = gf.projections().ok_or_else(|| {
                AssemblyError::IncompatibleSpaces(
                    "right-hand side must hold projections onto the dual space".to_string(),
                )
            })?;
            if projections.len() != n {
                return Err(AssemblyError::IncompatibleSpaces(format!(
                    "right-hand side block {block} has {} entries, expected {n}",
                    projections.len()
                )));
            }
            rhs.slice_mut(s![block * n..(block + 1) * n])
                .assign(projections);
        }
        Ok(rhs)
    }
}

/// Builds the combined interior + exterior system for a plane-wave excitation
pub struct MultitraceSystemBuilder<'a> {
    assembler: &'a dyn OperatorAssembler,
    spaces: &'a MultitraceSpaces,
    rule: TriangleRule,
}

impl<'a> MultitraceSystemBuilder<'a> {
    /// Create a builder; `rule` integrates the incident traces
    pub fn new(
        assembler: &'a dyn OperatorAssembler,
        spaces: &'a MultitraceSpaces,
        rule: TriangleRule,
    ) -> Self {
        Self {
            assembler,
            spaces,
            rule,
        }
    }

    /// Multitrace operator of the medium outside the scatterer
    pub fn exterior_operator(
        &self,
        physics: &PhysicsParams,
    ) -> Result<MultitraceOperator, AssemblyError> {
        MultitraceOperator::assemble(self.assembler, self.spaces, &physics.exterior_medium())
    }

    /// Multitrace operator of the dielectric
    pub fn interior_operator(
        &self,
        physics: &PhysicsParams,
    ) -> Result<MultitraceOperator, AssemblyError> {
        MultitraceOperator::assemble(self.assembler, self.spaces, &physics.interior_medium())
    }

    /// Project the incident traces onto the exterior dual space
    ///
    /// The plane wave lives in the exterior medium only, so its wavenumber
    /// must be `k_ext`.
    pub fn incident_rhs(
        &self,
        physics: &PhysicsParams,
        incident: &IncidentPlaneWave,
    ) -> Result<[GridFunction; 2], AssemblyError> {
        let k = incident.wavenumber();
        if (k - physics.k_ext).abs() > 1e-12 * physics.k_ext {
            return Err(AssemblyError::InvalidParameter {
                name: "incident_wavenumber",
                value: k,
            });
        }
        let tag = physics.exterior_medium().tag();
        let tangential = GridFunction::from_trace(
            &self.spaces.range,
            &self.spaces.dual_to_range,
            tag,
            &self.rule,
            |x, n| incident.tangential_trace(x, n),
        )?;
        let neumann = GridFunction::from_trace(
            &self.spaces.range,
            &self.spaces.dual_to_range,
            tag,
            &self.rule,
            |x, n| incident.neumann_trace(x, n),
        )?;
        Ok([tangential, neumann])
    }

    /// Assemble `A = A_ext + A_int` and the incident right-hand side
    pub fn build(
        &self,
        physics: &PhysicsParams,
        incident: &IncidentPlaneWave,
    ) -> Result<LinearSystem, AssemblyError> {
        let rhs = self.incident_rhs(physics, incident)?;
        let exterior = self.exterior_operator(physics)?;
        let interior = self.interior_operator(physics)?;
        let combined = exterior.add(&interior)?;

        Ok(LinearSystem {
            matrix: combined.into_matrix(),
            rhs,
            domain: self.spaces.domain.clone(),
            exterior: physics.exterior_medium().tag(),
            interior: physics.interior_medium().tag(),
        })
    }
}
