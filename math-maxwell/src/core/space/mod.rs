//! Discrete surface function spaces
//!
//! The RWG space attaches one divergence-conforming basis function to every
//! edge of a closed mesh. On the two triangles T⁺ and T⁻ sharing the edge
//!
//! ```text
//! f(r) = ( l / 2A⁺) (r − p⁺)   on T⁺
//! f(r) = (−l / 2A⁻) (r − p⁻)   on T⁻
//! ```
//!
//! where `p±` is the vertex opposite the edge and `l` the edge length. The
//! surface divergence is `±l/A±`. The rotated space uses `f × ν` and shares
//! the degrees of freedom; it serves as the dual-to-range (test) space.

mod grid_function;

pub use grid_function::{GridData, GridFunction};

use std::sync::Arc;

use crate::core::error::GeometryError;
use crate::core::mesh::{MeshEdge, MeshTopology, MeshValidation, TriangleMesh};
use crate::core::types::SpaceType;
use crate::core::vector::{Vec3, cross, scale, sub};

/// Basis kind of a function space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// Rao-Wilton-Glisson
    Rwg,
    /// RWG rotated by the normal, `f × ν`
    RotatedRwg,
}

/// Restriction of one basis function to one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalBasis {
    /// Global degree of freedom (edge index)
    pub dof: usize,
    /// +1 on T⁺, −1 on T⁻
    pub sign: f64,
    /// Vertex opposite the edge
    pub free_vertex: Vec3,
    /// `±l / 2A`, so that `f(r) = coefficient · (r − free_vertex)`
    pub coefficient: f64,
    /// Surface divergence `±l / A`
    pub divergence: f64,
}

impl LocalBasis {
    /// RWG value at a point of the triangle
    #[inline]
    pub fn value(&self, r: &Vec3) -> Vec3 {
        scale(self.coefficient, &sub(r, &self.free_vertex))
    }
}

#[derive(Debug)]
struct RwgBasis {
    mesh: Arc<TriangleMesh>,
    topology: MeshTopology,
    local: Vec<Vec<LocalBasis>>,
}

/// A discrete function space over a mesh
///
/// Cloning is cheap; clones (and the rotated variant) share the degrees of
/// freedom.
#[derive(Debug, Clone)]
pub struct FunctionSpace {
    kind: SpaceKind,
    basis: Arc<RwgBasis>,
}

impl FunctionSpace {
    /// RWG space on a closed mesh; the mesh is validated first
    pub fn rwg(
        mesh: Arc<TriangleMesh>,
        validation: &MeshValidation,
    ) -> Result<Self, GeometryError> {
        let topology = mesh.validate(validation)?;
        let mut local: Vec<Vec<LocalBasis>> = vec![Vec::with_capacity(3); mesh.num_triangles()];

        for (dof, edge) in topology.edges.iter().enumerate() {
            for (side, &t) in edge.triangles.iter().enumerate() {
                let sign = if side == 0 { 1.0 } else { -1.0 };
                let tri = mesh.triangle(t);
                let free = tri
                    .iter()
                    .copied()
                    .find(|v| !edge.vertices.contains(v))
                    .ok_or(GeometryError::DegenerateTriangle {
                        triangle: t,
                        area: mesh.area(t),
                    })?;
                let area = mesh.area(t);
                local[t].push(LocalBasis {
                    dof,
                    sign,
                    free_vertex: mesh.vertices()[free],
                    coefficient: sign * edge.length / (2.0 * area),
                    divergence: sign * edge.length / area,
                });
            }
        }

        Ok(Self {
            kind: SpaceKind::Rwg,
            basis: Arc::new(RwgBasis {
                mesh,
                topology,
                local,
            }),
        })
    }

    /// The rotated space `f × ν` on the same degrees of freedom
    pub fn rotated(&self) -> Self {
        Self {
            kind: SpaceKind::RotatedRwg,
            basis: Arc::clone(&self.basis),
        }
    }

    /// Basis kind
    pub fn kind(&self) -> SpaceKind {
        self.kind
    }

    /// Underlying mesh
    pub fn mesh(&self) -> &TriangleMesh {
        &self.basis.mesh
    }

    /// Shared handle to the underlying mesh
    pub fn mesh_handle(&self) -> Arc<TriangleMesh> {
        Arc::clone(&self.basis.mesh)
    }

    /// Number of global degrees of freedom
    pub fn global_dof_count(&self) -> usize {
        self.basis.topology.edges.len()
    }

    /// Edge carrying degree of freedom `dof`
    pub fn edge(&self, dof: usize) -> &MeshEdge {
        &self.basis.topology.edges[dof]
    }

    /// Basis functions supported on triangle `t`
    #[inline]
    pub fn local_basis(&self, t: usize) -> &[LocalBasis] {
        &self.basis.local[t]
    }

    /// True when both spaces are built on the same degrees of freedom
    pub fn shares_dofs_with(&self, other: &FunctionSpace) -> bool {
        Arc::ptr_eq(&self.basis, &other.basis)
    }

    /// Value of a local basis function of this space at `r` in triangle `t`
    #[inline]
    pub fn basis_value(&self, basis: &LocalBasis, t: usize, r: &Vec3) -> Vec3 {
        let f = basis.value(r);
        match self.kind {
            SpaceKind::Rwg => f,
            SpaceKind::RotatedRwg => cross(&f, &self.mesh().normal(t)),
        }
    }
}

/// Domain, range and dual-to-range spaces of the multitrace operator
#[derive(Debug, Clone)]
pub struct MultitraceSpaces {
    /// Trial space
    pub domain: FunctionSpace,
    /// Range space
    pub range: FunctionSpace,
    /// Test space
    pub dual_to_range: FunctionSpace,
}

impl MultitraceSpaces {
    /// Build the spaces of a layout on a mesh
    pub fn new(
        space_type: SpaceType,
        mesh: Arc<TriangleMesh>,
        validation: &MeshValidation,
    ) -> Result<Self, GeometryError> {
        match space_type {
            SpaceType::AllRwg => {
                let rwg = FunctionSpace::rwg(mesh, validation)?;
                Ok(Self {
                    domain: rwg.clone(),
                    dual_to_range: rwg.rotated(),
                    range: rwg,
                })
            }
        }
    }
}
